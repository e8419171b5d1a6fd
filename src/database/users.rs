use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use super::models::User;
use crate::domain::UserId;

pub fn insert_user(conn: &Connection, username: &str, non_player: bool) -> Result<User> {
    let sql = "INSERT INTO users (username, non_player, created_at) VALUES (?1, ?2, ?3) RETURNING id, username, non_player, created_at";

    conn.query_row(sql, params![username, non_player, Utc::now()], parse_user_row)
        .with_context(|| format!("Failed to insert user {}", username))
}

pub(super) fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        non_player: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub fn find_by_id(conn: &Connection, id: UserId) -> Result<Option<User>> {
    let sql = "SELECT id, username, non_player, created_at FROM users WHERE id = ?1";

    conn.query_row(sql, params![id], parse_user_row)
        .optional()
        .context("Failed to query user by id")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::setup::init_database;

    #[test]
    fn test_insert_and_find() {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();

        let ada = insert_user(&conn, "ada", false).unwrap();
        let bot = insert_user(&conn, "scorebot", true).unwrap();

        assert_eq!(find_by_id(&conn, ada.id).unwrap().unwrap().username, "ada");
        assert!(find_by_id(&conn, bot.id).unwrap().unwrap().non_player);
        assert_ne!(ada.id, bot.id);
        assert!(find_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();

        insert_user(&conn, "ada", false).unwrap();
        assert!(insert_user(&conn, "ada", false).is_err());
    }
}
