//! CSV-backed question bank.
//!
//! The source format is the Jeopardy archive export: every header but the
//! first carries a leading space, values are dollar strings (`$400`,
//! `$1,200`) or the literal `None` for unaired clues. Rows are filtered once
//! at load; question ids are the original row indices so they stay stable no
//! matter what gets filtered out.

use crate::types::Question;
use chrono::NaiveDate;
use rand::Rng;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;

/// Columns of one archive row, header names verbatim.
#[derive(Debug, Deserialize)]
struct SourceRow {
    #[serde(rename = " Air Date")]
    air_date: String,
    #[serde(rename = " Category")]
    category: String,
    #[serde(rename = " Value")]
    value: String,
    #[serde(rename = " Question")]
    question: String,
    #[serde(rename = " Answer")]
    answer: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BankError {
    #[error("failed to read question file: {0}")]
    Io(#[from] io::Error),

    #[error("failed to parse question file: {0}")]
    Csv(#[from] csv::Error),
}

/// Load-time row eligibility window.
#[derive(Debug, Clone)]
pub struct BankFilter {
    pub min_air_date: NaiveDate,
    pub min_value: u32,
    pub max_value: u32,
}

/// In-memory question pool, loaded once at startup.
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn load(path: &Path, filter: &BankFilter, points_name: &str) -> Result<Self, BankError> {
        let file = File::open(path)?;
        let bank = Self::from_reader(file, filter, points_name)?;
        tracing::info!(
            questions = bank.len(),
            path = %path.display(),
            "Question bank loaded"
        );
        Ok(bank)
    }

    /// Read rows from any CSV source. Rows with an out-of-range value, a
    /// `None` value, or a missing/too-old air date are dropped; ids keep
    /// counting through dropped rows.
    pub fn from_reader<R: io::Read>(
        reader: R,
        filter: &BankFilter,
        points_name: &str,
    ) -> Result<Self, BankError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut questions = Vec::new();

        for (id, row) in csv_reader.deserialize::<SourceRow>().enumerate() {
            let row = row?;

            let Some(value) = parse_value(&row.value) else {
                continue;
            };
            if value < filter.min_value || value > filter.max_value {
                continue;
            }
            let Ok(air_date) = NaiveDate::parse_from_str(row.air_date.trim(), "%Y-%m-%d") else {
                continue;
            };
            if air_date < filter.min_air_date {
                continue;
            }

            questions.push(Question {
                id,
                category: row.category,
                value,
                text: row.question,
                answer: row.answer,
                points_name: points_name.to_string(),
            });
        }

        Ok(Self { questions })
    }

    /// One uniform draw over rows matching the filters. Categories in the
    /// archive are uppercase, so the requested category is uppercased before
    /// the exact comparison.
    pub fn random_question(&self, category: Option<&str>, value: Option<u32>) -> Option<Question> {
        let category = category.map(|c| c.to_uppercase());
        let matching: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| category.as_deref().is_none_or(|c| q.category == c))
            .filter(|q| value.is_none_or(|v| q.value == v))
            .collect();

        if matching.is_empty() {
            return None;
        }
        let mut rng = rand::rng();
        Some(matching[rng.random_range(0..matching.len())].clone())
    }

    /// Sample up to `n` rows and return their distinct categories in first
    /// occurrence order. Collisions mean the result may be shorter than `n`.
    pub fn random_categories(&self, n: usize) -> Vec<String> {
        let mut rng = rand::rng();
        let amount = n.min(self.questions.len());
        let mut seen: Vec<String> = Vec::with_capacity(amount);

        for idx in rand::seq::index::sample(&mut rng, self.questions.len(), amount) {
            let category = &self.questions[idx].category;
            if !seen.contains(category) {
                seen.push(category.clone());
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// "$1,200" -> Some(1200); "None" (unaired clue) and junk -> None.
fn parse_value(raw: &str) -> Option<u32> {
    raw.trim().trim_start_matches('$').replace(',', "").parse().ok()
}
