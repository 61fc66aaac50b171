use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Request information handed to an authenticator.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    /// Header names are lowercased.
    pub headers: HashMap<String, String>,
    pub source_ip: IpAddr,
}

/// Authenticated caller identity.
///
/// With API-key auth every caller shares the same identity; per-user
/// attribution comes from the `user_id` the upload form carries. Session
/// token validation is a delegated service and is not performed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            user_id: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_identity() {
        let identity = Identity::anonymous();
        assert_eq!(identity.user_id, "anonymous");
        assert_eq!(identity.method, "none");
    }

    #[test]
    fn test_identity_serialization() {
        let identity = Identity {
            user_id: "user123".to_string(),
            method: "api_key".to_string(),
        };

        let json = serde_json::to_string(&identity).unwrap();
        let deserialized: Identity = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.user_id, "user123");
        assert_eq!(deserialized.method, "api_key");
    }
}
