use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::UserId;

/// A player's running state while an office's matches are replayed
///
/// Not persisted: every replay rebuilds players from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,
    pub username: String,
    pub rating: i32,
    pub win_count: u32,
    pub loss_count: u32,
    pub record_rating: i32,
    pub record_rating_date: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl Player {
    pub fn new(user_id: UserId, username: &str, rating: i32, is_active: bool) -> Self {
        Self {
            user_id,
            username: username.to_string(),
            rating,
            win_count: 0,
            loss_count: 0,
            record_rating: 0,
            record_rating_date: None,
            is_active,
        }
    }

    pub fn matches_played(&self) -> u32 {
        self.win_count + self.loss_count
    }

    pub fn win_percentage(&self) -> f64 {
        let total = self.matches_played();
        if total == 0 {
            return 0.0;
        }
        f64::from(self.win_count) / f64::from(total) * 100.0
    }
}
