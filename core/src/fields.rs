//! Permissive field extraction for inbound todo bodies.
//!
//! Each field either maps to a typed value or falls back to its default
//! (`""`, `0`, `false`, `None`). The parse result records which fields fell
//! back so callers can log it; rejecting an empty title is the caller's job.

use serde_json::Value;

/// Fields read from a create/update body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFields {
    pub title: String,
    pub order: i64,
    pub completed: bool,
    /// Only meaningful when authentication is disabled.
    pub user: Option<String>,
    /// Names of fields that were missing or had the wrong type.
    pub defaulted: Vec<&'static str>,
}

impl TodoFields {
    /// Extract fields from any JSON value. Non-objects yield all defaults.
    pub fn from_json(body: &Value) -> Self {
        let mut fields = TodoFields::default();

        match body.get("title").and_then(Value::as_str) {
            Some(title) => fields.title = title.to_string(),
            None => fields.defaulted.push("title"),
        }

        match body.get("order").and_then(as_integer) {
            Some(order) => fields.order = order,
            None => fields.defaulted.push("order"),
        }

        match body.get("completed").and_then(Value::as_bool) {
            Some(completed) => fields.completed = completed,
            None => fields.defaulted.push("completed"),
        }

        fields.user = body
            .get("user")
            .and_then(Value::as_str)
            .filter(|user| !user.is_empty())
            .map(str::to_string);

        fields
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }
}

// Floats truncate toward zero, matching how clients that send `1.0` expect
// an order of 1.
fn as_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_all_fields() {
        let fields = TodoFields::from_json(&json!({
            "title": "Buy milk",
            "order": 4,
            "completed": true,
            "user": "someone"
        }));
        assert_eq!(fields.title, "Buy milk");
        assert_eq!(fields.order, 4);
        assert!(fields.completed);
        assert_eq!(fields.user.as_deref(), Some("someone"));
        assert!(fields.defaulted.is_empty());
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let fields = TodoFields::from_json(&json!({}));
        assert_eq!(fields.title, "");
        assert_eq!(fields.order, 0);
        assert!(!fields.completed);
        assert!(fields.user.is_none());
        assert_eq!(fields.defaulted, vec!["title", "order", "completed"]);
        assert!(!fields.has_title());
    }

    #[test]
    fn wrong_types_fall_back_to_defaults() {
        let fields = TodoFields::from_json(&json!({
            "title": 12,
            "order": "first",
            "completed": "yes"
        }));
        assert_eq!(fields.title, "");
        assert_eq!(fields.order, 0);
        assert!(!fields.completed);
        assert_eq!(fields.defaulted.len(), 3);
    }

    #[test]
    fn float_order_is_truncated() {
        let fields = TodoFields::from_json(&json!({"title": "t", "order": 2.9}));
        assert_eq!(fields.order, 2);
        let fields = TodoFields::from_json(&json!({"title": "t", "order": -2.9}));
        assert_eq!(fields.order, -2);
    }

    #[test]
    fn non_object_body_yields_defaults() {
        let fields = TodoFields::from_json(&json!(["title", "order"]));
        assert!(!fields.has_title());
        assert_eq!(fields.order, 0);
    }

    #[test]
    fn empty_user_is_treated_as_absent() {
        let fields = TodoFields::from_json(&json!({"title": "t", "user": ""}));
        assert!(fields.user.is_none());
    }
}
