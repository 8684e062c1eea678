use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request bodies are only read from JSON objects; a missing key reads as
/// `null`. Deserializing through `Map` keeps serde from filling fields by
/// position out of a JSON array.
fn take(map: &mut Map<String, Value>, key: &str) -> Value {
    map.remove(key).unwrap_or(Value::Null)
}

// -- Users --

/// Body of `POST /api/users`.
///
/// Fields are kept as raw JSON values: bots post ids as numbers or numeric
/// strings, and the handler applies the coercion rules in [`crate::coerce`]
/// instead of rejecting the body at deserialization time.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CreateUserRequest {
    pub telegram_id: Value,
    pub username: Value,
    pub first_name: Value,
    pub last_name: Value,
}

impl From<Map<String, Value>> for CreateUserRequest {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            telegram_id: take(&mut map, "telegram_id"),
            username: take(&mut map, "username"),
            first_name: take(&mut map, "first_name"),
            last_name: take(&mut map, "last_name"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
}

// -- Messages --

/// Body of `POST /api/messages`.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct CreateMessageRequest {
    pub user_id: Value,
    pub chat_id: Value,
    pub text: Value,
}

impl From<Map<String, Value>> for CreateMessageRequest {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            user_id: take(&mut map, "user_id"),
            chat_id: take(&mut map, "chat_id"),
            text: take(&mut map, "text"),
        }
    }
}

/// A freshly inserted message, echoed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub id: i64,
    pub user_id: i64,
    pub chat_id: Option<String>,
    pub text: String,
    pub created_at: String,
}

/// A listed message joined with its author's name fields. The name fields are
/// null when the referenced user row does not exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageListItem {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub chat_id: Option<String>,
    pub created_at: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

// -- Stats --

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub users: i64,
    pub messages: i64,
    pub last_message_at: Option<String>,
}

// -- Misc --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body shared by every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
