mod round;
mod score;

pub use round::StartedRound;

use crate::audit::AuditLog;
use crate::config::Config;
use crate::cooldown::Cooldown;
use crate::protocol::ServerMessage;
use crate::questions::QuestionBank;
use crate::types::{QuestionId, ScoreEntry};
use round::OpenRound;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;

/// Shared session state
pub struct SessionState {
    pub config: Config,
    pub bank: QuestionBank,
    pub audit: AuditLog,
    /// Broadcast channel for sending chat lines to connected clients
    pub broadcast: broadcast::Sender<ServerMessage>,
    /// One free award per user per day.
    pub daily_gate: Cooldown,
    /// One free award per user per hour.
    pub hourly_gate: Cooldown,
    /// Held by the task driving a round from start to resolution. A failed
    /// `try_lock` is how a second start attempt learns a round is running.
    round_gate: Arc<Mutex<()>>,
    /// Submission-side view of the open question, `None` outside a round.
    open_round: Mutex<Option<OpenRound>>,
    /// When the latest round started, for the inter-round cooldown.
    last_start: Mutex<Option<Instant>>,
    /// Ids of every question asked this session, won or not.
    history: Mutex<HashSet<QuestionId>>,
    /// Insertion order doubles as tie order on the scoreboard.
    scores: Mutex<Vec<ScoreEntry>>,
}

impl SessionState {
    pub fn new(config: Config, bank: QuestionBank, audit: AuditLog) -> Self {
        let (tx, _rx) = broadcast::channel(100);
        let daily_gate = Cooldown::new(config.daily_cooldown);
        let hourly_gate = Cooldown::new(config.hourly_cooldown);
        Self {
            config,
            bank,
            audit,
            broadcast: tx,
            daily_gate,
            hourly_gate,
            round_gate: Arc::new(Mutex::new(())),
            open_round: Mutex::new(None),
            last_start: Mutex::new(None),
            history: Mutex::new(HashSet::new()),
            scores: Mutex::new(Vec::new()),
        }
    }

    /// Broadcast one chat line as the bot.
    pub fn say(&self, text: impl Into<String>) {
        let message = ServerMessage::Chat {
            from: self.config.bot_name.clone(),
            text: text.into(),
        };
        // Ignore send errors (no receivers connected)
        let _ = self.broadcast.send(message);
    }

    /// How many questions this session has asked so far.
    pub async fn asked_count(&self) -> usize {
        self.history.lock().await.len()
    }
}
