//! Full CRUD lifecycle over a real socket.
//!
//! # Design
//! Starts the server on a random port with a static token table, then drives
//! every endpoint over real HTTP using ureq, the way a browser client would.

use std::collections::HashMap;
use std::sync::Arc;

use todo_core::{CallerIdentity, MemoryStore, TodoView};
use todo_server::{AppState, AuthSettings, ServerConfig};

const TOKEN: &str = "live-token";

struct Client {
    agent: ureq::Agent,
    base: String,
}

impl Client {
    /// Disables ureq's status-code-as-error behavior so 4xx responses come
    /// back as data.
    fn new(base: String) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent, base }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    fn bearer() -> String {
        format!("Bearer {TOKEN}")
    }

    fn get(&self, path: &str) -> (u16, String) {
        let response = self
            .agent
            .get(self.url(path))
            .header("Authorization", Self::bearer())
            .call()
            .expect("HTTP transport error");
        read(response)
    }

    fn post(&self, path: &str, body: &str) -> (u16, String) {
        let response = self
            .agent
            .post(self.url(path))
            .header("Authorization", Self::bearer())
            .content_type("application/json")
            .send(body.as_bytes())
            .expect("HTTP transport error");
        read(response)
    }

    fn patch(&self, path: &str, body: &str) -> (u16, String) {
        let response = self
            .agent
            .patch(self.url(path))
            .header("Authorization", Self::bearer())
            .content_type("application/json")
            .send(body.as_bytes())
            .expect("HTTP transport error");
        read(response)
    }

    fn delete(&self, path: &str) -> (u16, String) {
        let response = self
            .agent
            .delete(self.url(path))
            .header("Authorization", Self::bearer())
            .call()
            .expect("HTTP transport error");
        read(response)
    }
}

fn read(mut response: ureq::http::Response<ureq::Body>) -> (u16, String) {
    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    (status, body)
}

#[test]
fn crud_lifecycle() {
    // Step 1: start the server on a random port.
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let mut tokens = HashMap::new();
    tokens.insert(TOKEN.to_string(), CallerIdentity::new("u-live", "Live"));
    let config = ServerConfig::new(addr)
        .with_base_url(format!("http://{addr}"))
        .with_auth(AuthSettings::Static(tokens));
    let state = AppState::from_config(&config, Arc::new(MemoryStore::new())).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener, state).await
        })
        .unwrap();
    });

    let client = Client::new(format!("http://{addr}"));

    // Step 2: list is empty.
    let (status, body) = client.get("/todos");
    assert_eq!(status, 200);
    let todos: Vec<TodoView> = serde_json::from_str(&body).unwrap();
    assert!(todos.is_empty());

    // Step 3: create.
    let (status, body) = client.post("/todos", r#"{"title":"Integration test","order":1}"#);
    assert_eq!(status, 200);
    let created: TodoView = serde_json::from_str(&body).unwrap();
    assert_eq!(created.user, "u-live");
    assert_eq!(created.url, format!("http://{addr}/todos/{}", created.id));

    // Step 4: get it back.
    let (status, body) = client.get(&format!("/todos/{}", created.id));
    assert_eq!(status, 200);
    let fetched: TodoView = serde_json::from_str(&body).unwrap();
    assert_eq!(fetched, created);

    // Step 5: complete it.
    let (status, body) = client.patch(
        &format!("/todos/{}", created.id),
        r#"{"title":"Integration test","order":1,"completed":true}"#,
    );
    assert_eq!(status, 200);
    let updated: TodoView = serde_json::from_str(&body).unwrap();
    assert!(updated.completed);

    // Step 6: delete, then delete again.
    let (status, body) = client.delete(&format!("/todos/{}", created.id));
    assert_eq!(status, 200);
    assert!(body.is_empty());
    let (status, _) = client.delete(&format!("/todos/{}", created.id));
    assert_eq!(status, 400);

    // Step 7: clear an already-empty list.
    let (status, _) = client.delete("/todos");
    assert_eq!(status, 200);
    let (_, body) = client.get("/todos");
    let todos: Vec<TodoView> = serde_json::from_str(&body).unwrap();
    assert!(todos.is_empty());
}
