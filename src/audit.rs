//! Append-only audit trail.
//!
//! Two tab-separated files: one line per finished round, one line per
//! submitted answer. Writes go through tokio mutexes so concurrent rounds
//! and submissions never interleave partial lines; write failures are
//! logged and swallowed so a full disk cannot take the session down.

use crate::types::{ChatUser, Question, QuestionId};
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tokio::sync::Mutex;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub struct AuditLog {
    history: Mutex<File>,
    submissions: Mutex<File>,
}

impl AuditLog {
    pub fn open(history_path: &Path, submissions_path: &Path) -> io::Result<Self> {
        Ok(Self {
            history: Mutex::new(append_file(history_path)?),
            submissions: Mutex::new(append_file(submissions_path)?),
        })
    }

    /// One line per resolved round. A round without a winner records id `0`
    /// and name `null` so the column count stays fixed.
    pub async fn record_round(&self, stream_id: &str, question: &Question, winner: Option<&ChatUser>) {
        let (winner_id, winner_name) = match winner {
            Some(user) => (user.id.to_string(), user.name.as_str()),
            None => ("0".to_string(), "null"),
        };
        let line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            Utc::now().format(TIMESTAMP_FORMAT),
            stream_id,
            question.id,
            winner_id,
            winner_name,
            question.value,
        );
        append_line(&self.history, &line, "round history").await;
    }

    /// Every answer attempt against an open question, win or lose.
    pub async fn record_submission(&self, question_id: QuestionId, user: &ChatUser, raw_message: &str) {
        let line = format!(
            "{}\t{}\t{}\t{}\t{}",
            Utc::now().format(TIMESTAMP_FORMAT),
            question_id,
            user.id,
            user.name,
            raw_message,
        );
        append_line(&self.submissions, &line, "submission").await;
    }
}

fn append_file(path: &Path) -> io::Result<File> {
    OpenOptions::new().append(true).create(true).open(path)
}

async fn append_line(sink: &Mutex<File>, line: &str, kind: &str) {
    let mut file = sink.lock().await;
    if let Err(error) = writeln!(file, "{line}") {
        tracing::warn!(%error, kind, "Failed to append audit record");
    }
}
