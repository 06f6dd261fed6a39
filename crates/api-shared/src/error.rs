use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON body of every failed request: `{"error": "...", "details"?: ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_are_omitted_when_absent() {
        let body = serde_json::to_value(ErrorBody::new("Patient not found")).expect("serialise");
        assert_eq!(body, serde_json::json!({"error": "Patient not found"}));
    }

    #[test]
    fn test_details_are_rendered() {
        let body = ErrorBody::new("bad input").with_details(serde_json::json!("missing field"));
        let json = serde_json::to_value(body).expect("serialise");
        assert_eq!(json["details"], "missing field");
    }
}
