use std::time::Duration;
use ulid::Ulid;

/// Question ids are the 0-based row index of the source CSV, stable across
/// load-time filtering.
pub type QuestionId = usize;

/// Identity handed out by the chat transport when a client connects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: Ulid,
    pub name: String,
}

/// One quiz question as served by the bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub category: String,
    pub value: u32,
    /// Raw question text; may contain markup, strip before display.
    pub text: String,
    /// Raw answer text, announced verbatim at resolution.
    pub answer: String,
    /// Display label for the point unit ("points", "shinies", ...).
    pub points_name: String,
}

impl Question {
    /// Value plus unit, for announcements: "500 points".
    pub fn points_label(&self) -> String {
        format!("{} {}", self.value, self.points_name)
    }
}

/// One user's cumulative winnings this session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreEntry {
    pub name: String,
    pub total: u64,
}

/// Why a round start was refused. Every variant maps to exactly one chat
/// message; none of these is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartRejected {
    /// A round is already running; try again once it resolves.
    AlreadyOpen { remaining: Duration },
    /// Not enough time since the previous round started.
    Cooldown { remaining: Duration },
    /// Requested value is not one of the configured tiers.
    InvalidValue,
    /// No question matches the requested category/value.
    NoMatch,
    /// The drawn question was already used this session.
    AlreadyAsked,
}

/// What happened to one answer submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Checked against the open question (and recorded as winner on match).
    Accepted,
    /// Nothing to answer right now.
    NoActiveQuestion,
    /// Someone already answered correctly; logged but not scored.
    AlreadyResolved,
}

/// How a round ended.
#[derive(Debug, Clone)]
pub enum Resolution {
    Winner { user: ChatUser, question: Question },
    NoWinner { question: Question },
}
