use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::{Row, params};

use crate::Database;
use crate::models::{
    MessageRow, MessageWithAuthorRow, NewMessage, NewUser, StatsRow, UserRow,
};

/// Current time in the sortable form stored in every `created_at` column,
/// e.g. `2024-05-01T12:00:00.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl Database {
    // -- Users --

    pub fn create_user(&self, user: NewUser) -> Result<UserRow> {
        let created_at = timestamp_now();
        let id = self.execute(
            "INSERT INTO users (telegram_id, username, first_name, last_name, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.telegram_id,
                user.username,
                user.first_name,
                user.last_name,
                created_at
            ],
        )?;

        Ok(UserRow {
            id,
            telegram_id: user.telegram_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at,
        })
    }

    pub fn list_users(&self, limit: u32) -> Result<Vec<UserRow>> {
        self.fetch_all(
            "SELECT id, telegram_id, username, first_name, last_name, created_at
             FROM users
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
            [limit],
            map_user,
        )
    }

    // -- Messages --

    /// Inserts a message. The `user_id` is only checked against `users` when
    /// the store was opened with foreign keys enforced.
    pub fn create_message(&self, message: NewMessage) -> Result<MessageRow> {
        let created_at = timestamp_now();
        let id = self.execute(
            "INSERT INTO messages (user_id, chat_id, text, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![message.user_id, message.chat_id, message.text, created_at],
        )?;

        Ok(MessageRow {
            id,
            user_id: message.user_id,
            chat_id: message.chat_id,
            text: message.text,
            created_at,
        })
    }

    pub fn list_messages(&self, limit: u32) -> Result<Vec<MessageWithAuthorRow>> {
        // LEFT JOIN so messages pointing at a missing user still show up
        self.fetch_all(
            "SELECT m.id, m.user_id, m.text, m.chat_id, m.created_at,
                    u.username, u.first_name, u.last_name
             FROM messages m
             LEFT JOIN users u ON m.user_id = u.id
             ORDER BY m.created_at DESC, m.id DESC
             LIMIT ?1",
            [limit],
            |row| {
                Ok(MessageWithAuthorRow {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    text: row.get(2)?,
                    chat_id: row.get(3)?,
                    created_at: row.get(4)?,
                    username: row.get(5)?,
                    first_name: row.get(6)?,
                    last_name: row.get(7)?,
                })
            },
        )
    }

    // -- Stats --

    pub fn stats(&self) -> Result<StatsRow> {
        let users = self
            .fetch_one("SELECT COUNT(*) FROM users", [], |row| row.get::<_, i64>(0))?
            .unwrap_or(0);
        let messages = self
            .fetch_one("SELECT COUNT(*) FROM messages", [], |row| row.get::<_, i64>(0))?
            .unwrap_or(0);
        // MAX over an empty table yields a single NULL row
        let last_message_at = self
            .fetch_one("SELECT MAX(created_at) FROM messages", [], |row| {
                row.get::<_, Option<String>>(0)
            })?
            .flatten();

        Ok(StatsRow {
            users,
            messages,
            last_message_at,
        })
    }

    /// Cheap round trip used by the health check.
    pub fn ping(&self) -> Result<()> {
        self.fetch_one("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }
}

fn map_user(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        username: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        created_at: row.get(5)?,
    })
}
