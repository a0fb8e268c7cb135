use serde::{Deserialize, Serialize};

// Request bodies keep every field optional: a missing or null field is a
// validation failure reported by the handler, not a deserialization error.

/// Returns the value only when it is present and non-empty.
pub fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|v| !v.is_empty())
}

// -- Greetings --

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Greeting {
    pub id: i64,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GreetingRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

// -- Users --

/// Public view of a user. The password hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_missing_and_empty() {
        assert_eq!(required(&None), None);
        assert_eq!(required(&Some(String::new())), None);
        assert_eq!(required(&Some("Hi".into())), Some("Hi"));
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let req: GreetingRequest = serde_json::from_str(r#"{"title":"Hi"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("Hi"));
        assert!(req.message.is_none());

        let req: SignupRequest =
            serde_json::from_str(r#"{"name":"Ann","email":null,"extra":1}"#).unwrap();
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }
}
