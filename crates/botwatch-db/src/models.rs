//! Database row types. These map directly to SQLite rows.
//! Distinct from botwatch-types API models to keep the DB layer independent.

pub struct NewUser {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
}

pub struct NewMessage {
    pub user_id: i64,
    pub chat_id: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub user_id: i64,
    pub chat_id: Option<String>,
    pub text: String,
    pub created_at: String,
}

/// A message left-joined with the name fields of its author.
#[derive(Debug, Clone)]
pub struct MessageWithAuthorRow {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub chat_id: Option<String>,
    pub created_at: String,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatsRow {
    pub users: i64,
    pub messages: i64,
    pub last_message_at: Option<String>,
}
