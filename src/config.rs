//! Runtime configuration from environment variables.
//!
//! Everything has a workable default so `triviad` starts with no
//! environment at all (assuming a `questions.csv` next to the binary).

use crate::questions::BankFilter;
use chrono::{NaiveDate, Utc};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Chat name the session speaks as.
    pub bot_name: String,
    /// Tag written into every round audit record.
    pub stream_id: String,
    /// What a point is called in chat ("points", "shinies", ...).
    pub points_name: String,
    pub questions_csv: PathBuf,
    pub min_air_date: NaiveDate,
    pub value_min: u32,
    pub value_max: u32,
    pub value_step: u32,
    /// How long a question stays open for answers.
    pub round_duration: Duration,
    /// Minimum gap between one round starting and the next.
    pub question_cooldown: Duration,
    pub daily_cooldown: Duration,
    pub hourly_cooldown: Duration,
    pub history_log: PathBuf,
    pub submission_log: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 6573,
            bot_name: "triviabot".to_string(),
            stream_id: Utc::now().format("%Y-%m-%d").to_string(),
            points_name: "points".to_string(),
            questions_csv: PathBuf::from("questions.csv"),
            min_air_date: NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
            value_min: 100,
            value_max: 2000,
            value_step: 100,
            round_duration: Duration::from_secs(60),
            question_cooldown: Duration::from_secs(30),
            daily_cooldown: Duration::from_secs(86_400),
            hourly_cooldown: Duration::from_secs(3_600),
            history_log: PathBuf::from("history.log"),
            submission_log: PathBuf::from("submissions.log"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let config = Self {
            port: env_parse("PORT", defaults.port),
            bot_name: env_or("TRIVIA_BOT_NAME", defaults.bot_name),
            stream_id: env_or("TRIVIA_STREAM_ID", defaults.stream_id),
            points_name: env_or("TRIVIA_POINTS_NAME", defaults.points_name),
            questions_csv: env_or("TRIVIA_QUESTIONS_CSV", defaults.questions_csv),
            min_air_date: env_parse("TRIVIA_MIN_AIR_DATE", defaults.min_air_date),
            value_min: env_parse("TRIVIA_VALUE_MIN", defaults.value_min),
            value_max: env_parse("TRIVIA_VALUE_MAX", defaults.value_max),
            // A zero step would make every value invalid via modulo.
            value_step: env_parse("TRIVIA_VALUE_STEP", defaults.value_step).max(1),
            round_duration: env_secs("TRIVIA_ROUND_SECS", defaults.round_duration),
            question_cooldown: env_secs("TRIVIA_COOLDOWN_SECS", defaults.question_cooldown),
            daily_cooldown: env_secs("TRIVIA_DAILY_COOLDOWN_SECS", defaults.daily_cooldown),
            hourly_cooldown: env_secs("TRIVIA_HOURLY_COOLDOWN_SECS", defaults.hourly_cooldown),
            history_log: env_or("TRIVIA_HISTORY_LOG", defaults.history_log),
            submission_log: env_or("TRIVIA_SUBMISSION_LOG", defaults.submission_log),
        };
        tracing::info!(
            port = config.port,
            bot = %config.bot_name,
            stream = %config.stream_id,
            questions = %config.questions_csv.display(),
            round_secs = config.round_duration.as_secs(),
            cooldown_secs = config.question_cooldown.as_secs(),
            "Configuration loaded"
        );
        config
    }

    pub fn bank_filter(&self) -> BankFilter {
        BankFilter {
            min_air_date: self.min_air_date,
            min_value: self.value_min,
            max_value: self.value_max,
        }
    }

    /// A requested point value must sit on the configured grid.
    pub fn valid_tier(&self, value: u32) -> bool {
        value >= self.value_min && value <= self.value_max && value % self.value_step == 0
    }
}

/// Env string with fallback; unset, empty, and whitespace-only all fall back.
fn env_or<T: From<String>>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(T::from)
        .unwrap_or(default)
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_secs(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}
