use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
    pub message: String,
}

/// Simple health service shared by every API surface.
///
/// The process answering at all is the health signal; no collaborator is probed.
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthService;

impl HealthService {
    /// Reports the service as alive.
    ///
    /// # Returns
    /// A `HealthResponse` with `ok` set.
    pub fn check_health() -> HealthResponse {
        HealthResponse {
            ok: true,
            message: "Dental API is alive".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_is_ok() {
        let res = HealthService::check_health();
        assert!(res.ok);
        assert_eq!(
            serde_json::to_value(&res).expect("should serialise"),
            serde_json::json!({"ok": true, "message": "Dental API is alive"})
        );
    }
}
