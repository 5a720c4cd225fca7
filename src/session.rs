//! Chat command dispatch
//!
//! Entry point for every chat line. Lines starting with `!` are parsed as
//! commands and routed to a handler; everything else is plain chat and never
//! reaches this module's handlers. Round announcements, scoreboards, and
//! award lines all go back out through the shared broadcast as the bot.

use crate::cooldown::{Cooldown, CooldownCheck};
use crate::normalize::strip_markup;
use crate::state::{SessionState, StartedRound};
use crate::types::{ChatUser, Resolution, StartRejected, SubmitOutcome};
use std::sync::Arc;

pub const COMMAND_PREFIX: char = '!';

/// Paid out through `!addpoints` lines for an external points bot to apply.
const DAILY_AWARD: u64 = 1000;
const HOURLY_AWARD: u64 = 100;

/// How many rows to sample when chat asks for category ideas.
const CATEGORY_SAMPLE: usize = 5;

pub fn help_text() -> String {
    "Try (!trivia), (!trivia VALUE), or (!trivia CATEGORY VALUE). \
     Use (!trivia categories) for random categories. \
     Answer with (!whatis ANSWER)"
        .to_string()
}

/// Route one chat line. Commands that open a round keep running until the
/// round resolves, so callers that must not block should spawn this.
pub async fn dispatch(state: &Arc<SessionState>, user: &ChatUser, line: &str) {
    if !line.starts_with(COMMAND_PREFIX) {
        return;
    }

    match line.split(' ').next().unwrap_or_default() {
        "!trivia" => handle_request(state, line).await,
        "!whatis" | "!whois" | "!whereis" => handle_submission(state, user, line).await,
        "!scoreboard" => handle_scoreboard(state).await,
        "!balance" => handle_balance(state, user).await,
        "!daily" => handle_award(state, &state.daily_gate, user, DAILY_AWARD).await,
        "!hourly" => handle_award(state, &state.hourly_gate, user, HOURLY_AWARD).await,
        other => tracing::debug!(command = other, "Unknown command"),
    }
}

async fn handle_request(state: &Arc<SessionState>, line: &str) {
    if line == "!trivia help" {
        state.say(help_text());
        return;
    }
    if line == "!trivia categories" {
        state.say(state.bank.random_categories(CATEGORY_SAMPLE).join(" | "));
        return;
    }

    let (category, value) = split_request(line);
    match state.try_start(category.as_deref(), value).await {
        Ok(round) => run_round(state, round).await,
        Err(reason) => state.say(reject_message(state, &reason)),
    }
}

/// Announce the question, wait out the round, then announce the outcome.
async fn run_round(state: &Arc<SessionState>, round: StartedRound) {
    state.say(format!(
        "{} for {}",
        round.question.category,
        round.question.points_label()
    ));
    state.say(strip_markup(&round.question.text));

    let resolution = state.run_to_resolution(&round).await;

    state.say(format!("Answer: {}", round.question.answer));
    match resolution {
        Resolution::Winner { user, question } => {
            state.say(format!("!addpoints {} {}", user.name, question.value));
            state.award_points(&user.name, u64::from(question.value)).await;
            state
                .audit
                .record_round(&state.config.stream_id, &question, Some(&user))
                .await;
        }
        Resolution::NoWinner { question } => {
            state.say("No one got it right D:");
            state
                .audit
                .record_round(&state.config.stream_id, &question, None)
                .await;
        }
    }
}

async fn handle_submission(state: &Arc<SessionState>, user: &ChatUser, line: &str) {
    match state.submit(user, line).await {
        SubmitOutcome::NoActiveQuestion => {
            state.say(format!(
                "{}, there's no active question, see (!trivia help)",
                user.name
            ));
        }
        // Wrong guesses stay quiet; the winner is announced at resolution.
        SubmitOutcome::Accepted | SubmitOutcome::AlreadyResolved => {}
    }
}

async fn handle_scoreboard(state: &Arc<SessionState>) {
    let board = state.leaderboard().await;
    if board.is_empty() {
        return;
    }
    let line = board
        .iter()
        .map(|entry| format!("{}: ${}", entry.name, entry.total))
        .collect::<Vec<_>>()
        .join(" | ");
    state.say(line);
}

async fn handle_balance(state: &Arc<SessionState>, user: &ChatUser) {
    let total = state.balance(&user.name).await;
    state.say(format!(
        "{}, you won {} {} this stream!",
        user.name, total, state.config.points_name
    ));
}

async fn handle_award(state: &Arc<SessionState>, gate: &Cooldown, user: &ChatUser, amount: u64) {
    match gate.try_invoke(&user.name).await {
        CooldownCheck::Allowed => {
            state.say(format!("!addpoints {} {}", user.name, amount));
        }
        CooldownCheck::Denied { remaining } => {
            // Denied awards log only, no chat reply.
            tracing::info!(
                user = %user.name,
                remaining_secs = remaining.as_secs(),
                "Award still on cooldown"
            );
        }
    }
}

/// Split `!trivia [CATEGORY] [VALUE]` into its optional filters. A trailing
/// all-digit token is consumed as the value; if it overflows, the value
/// filter is simply dropped.
fn split_request(line: &str) -> (Option<String>, Option<u32>) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 2 {
        return (None, None);
    }

    let args = &tokens[1..];
    let (category_tokens, value) = match args.last() {
        Some(last) if !last.is_empty() && last.chars().all(|c| c.is_ascii_digit()) => {
            (&args[..args.len() - 1], last.parse::<u32>().ok())
        }
        _ => (args, None),
    };

    let category = if category_tokens.is_empty() {
        None
    } else {
        Some(category_tokens.join(" "))
    };
    (category, value)
}

fn reject_message(state: &SessionState, reason: &StartRejected) -> String {
    match reason {
        StartRejected::AlreadyOpen { remaining } => format!(
            "There's still {} seconds left on the current question!",
            remaining.as_secs()
        ),
        StartRejected::Cooldown { remaining } => {
            format!("Next question available in {} seconds.", remaining.as_secs())
        }
        StartRejected::InvalidValue => format!(
            "Please use a point value between {} and {}, in increments of {}",
            state.config.value_min, state.config.value_max, state.config.value_step
        ),
        StartRejected::NoMatch => "Hmmm... couldn't find a question for that.".to_string(),
        StartRejected::AlreadyAsked => "Hmmm... seems all those questions were asked.".to_string(),
    }
}
