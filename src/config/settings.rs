use crate::processing::replay::{
    ACTIVE_WINDOW_WEEKS, RATING_FLOOR, ROOKIE_MATCHES, STARTING_RATING,
};
use crate::rating::elo::{HANDICAP_MULTIPLIER, K_FACTOR};

#[derive(Debug, Clone)]
pub struct RatingSettings {
    pub starting_rating: i32,
    pub rating_floor: i32,
    pub k_factor: f64,
    pub handicap_multiplier: f64,
    pub rookie_matches: u32,
    pub active_window_weeks: i64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            starting_rating: STARTING_RATING,
            rating_floor: RATING_FLOOR,
            k_factor: K_FACTOR,
            handicap_multiplier: HANDICAP_MULTIPLIER,
            rookie_matches: ROOKIE_MATCHES,
            active_window_weeks: ACTIVE_WINDOW_WEEKS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "office_ladder.db".to_string()),
            pool_size: 8,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rating: RatingSettings,
    pub database: DatabaseSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self {
            rating: RatingSettings::default(),
            database: DatabaseSettings::default(),
        }
    }
}
