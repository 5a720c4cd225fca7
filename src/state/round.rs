use super::SessionState;
use crate::normalize::{answers_match, strip_command};
use crate::types::{ChatUser, Question, Resolution, StartRejected, SubmitOutcome};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, OwnedMutexGuard};
use tokio::time::Instant;

/// Submission-side view of the question currently on the floor.
pub(crate) struct OpenRound {
    pub question: Question,
    pub deadline: Instant,
    pub winner: Option<ChatUser>,
    /// Wakes the round driver the moment a winner lands. Fresh per round so
    /// a permit from one round can never leak into the next.
    pub winner_signal: Arc<Notify>,
}

/// Handle held by the task driving a round. Dropping it releases the start
/// gate, so it must outlive the call to [`SessionState::run_to_resolution`].
#[derive(Debug)]
pub struct StartedRound {
    pub question: Question,
    deadline: Instant,
    winner_signal: Arc<Notify>,
    _gate: OwnedMutexGuard<()>,
}

impl SessionState {
    /// Try to open a round. Never waits: a running round, an elapsed-too-soon
    /// previous round, a bad value, or an empty draw all reject immediately.
    pub async fn try_start(
        &self,
        category: Option<&str>,
        value: Option<u32>,
    ) -> Result<StartedRound, StartRejected> {
        let Ok(gate) = Arc::clone(&self.round_gate).try_lock_owned() else {
            return Err(StartRejected::AlreadyOpen {
                remaining: self.remaining_time().await,
            });
        };

        if let Some(last) = *self.last_start.lock().await {
            let since = last.elapsed();
            if since < self.config.question_cooldown {
                return Err(StartRejected::Cooldown {
                    remaining: self.config.question_cooldown - since,
                });
            }
        }

        if let Some(value) = value {
            if !self.config.valid_tier(value) {
                return Err(StartRejected::InvalidValue);
            }
        }

        let Some(question) = self.bank.random_question(category, value) else {
            return Err(StartRejected::NoMatch);
        };

        // One draw only: a repeat is reported back, not rerolled.
        if !self.history.lock().await.insert(question.id) {
            return Err(StartRejected::AlreadyAsked);
        }

        let now = Instant::now();
        let deadline = now + self.config.round_duration;
        *self.last_start.lock().await = Some(now);

        let winner_signal = Arc::new(Notify::new());
        *self.open_round.lock().await = Some(OpenRound {
            question: question.clone(),
            deadline,
            winner: None,
            winner_signal: Arc::clone(&winner_signal),
        });

        tracing::info!(
            question = question.id,
            category = %question.category,
            value = question.value,
            "Round opened"
        );

        Ok(StartedRound {
            question,
            deadline,
            winner_signal,
            _gate: gate,
        })
    }

    /// Seconds left on the open question, zero when nothing is open.
    pub async fn remaining_time(&self) -> Duration {
        match self.open_round.lock().await.as_ref() {
            Some(open) => open.deadline.saturating_duration_since(Instant::now()),
            None => Duration::ZERO,
        }
    }

    /// Park until someone wins or the deadline passes, then close the round.
    /// A correct answer landing between the deadline firing and the slot
    /// being taken still counts.
    pub async fn run_to_resolution(&self, round: &StartedRound) -> Resolution {
        tokio::select! {
            _ = round.winner_signal.notified() => {}
            _ = tokio::time::sleep_until(round.deadline) => {}
        }

        let resolution = match self.open_round.lock().await.take() {
            Some(OpenRound { winner: Some(user), question, .. }) => {
                Resolution::Winner { user, question }
            }
            Some(OpenRound { winner: None, question, .. }) => Resolution::NoWinner { question },
            None => {
                tracing::warn!(question = round.question.id, "Open round slot already empty");
                Resolution::NoWinner { question: round.question.clone() }
            }
        };

        match &resolution {
            Resolution::Winner { user, question } => {
                tracing::info!(question = question.id, winner = %user.name, "Round resolved");
            }
            Resolution::NoWinner { question } => {
                tracing::info!(question = question.id, "Round resolved without a winner");
            }
        }
        resolution
    }

    /// Check one answer against the open question. First correct submission
    /// claims the win; everything after it is reported as already resolved.
    /// Every attempt against an open question lands in the audit trail.
    pub async fn submit(&self, user: &ChatUser, raw_message: &str) -> SubmitOutcome {
        let mut slot = self.open_round.lock().await;
        let Some(open) = slot.as_mut() else {
            return SubmitOutcome::NoActiveQuestion;
        };
        let question_id = open.question.id;

        let outcome = if open.winner.is_some() {
            SubmitOutcome::AlreadyResolved
        } else {
            let answer = strip_command(raw_message);
            if answers_match(&answer, &open.question.answer) {
                open.winner = Some(user.clone());
                open.winner_signal.notify_one();
                tracing::info!(question = question_id, user = %user.name, "Winning answer");
            }
            SubmitOutcome::Accepted
        };
        drop(slot);

        self.audit.record_submission(question_id, user, raw_message).await;
        outcome
    }
}
