use serde::{Deserialize, Serialize};

use crate::normalize::{collapse_whitespace, dedupe_preserving_order};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionRecord {
    pub question_text: String,
    pub all_answers: Vec<String>,
    pub correct_answers: Vec<String>,
    pub has_identified_correct_answer: bool,
}

impl QuestionRecord {
    /// Builds a record holding the data-model invariants: trimmed fields,
    /// unique options in source order, and no correct answers unless identified.
    pub fn new(
        question_text: &str,
        all_answers: Vec<String>,
        correct_answers: Vec<String>,
        has_identified_correct_answer: bool,
    ) -> Self {
        let correct_answers = if has_identified_correct_answer {
            dedupe_preserving_order(correct_answers)
        } else {
            Vec::new()
        };

        Self {
            question_text: collapse_whitespace(question_text),
            all_answers: dedupe_preserving_order(all_answers),
            correct_answers,
            has_identified_correct_answer,
        }
    }

    pub fn from_interchange(record: InterchangeRecord) -> Self {
        let identified = record
            .correct_answers
            .iter()
            .any(|answer| !answer.trim().is_empty());
        Self::new(
            &record.question_text,
            record.all_answers,
            record.correct_answers,
            identified,
        )
    }

    pub fn to_interchange(&self) -> InterchangeRecord {
        InterchangeRecord {
            question_text: self.question_text.clone(),
            all_answers: self.all_answers.clone(),
            correct_answers: self.correct_answers.clone(),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.question_text.is_empty() && self.all_answers.is_empty()
    }
}

/// Persisted form of a record; the identified flag is re-derived on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeRecord {
    #[serde(default)]
    pub question_text: String,
    #[serde(default)]
    pub all_answers: Vec<String>,
    #[serde(default)]
    pub correct_answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: String,
    pub size_bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub source_kind: String,
    pub source_count: usize,
    pub sources: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceOutcome {
    pub path: String,
    pub sha256: Option<String>,
    pub record_count: usize,
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunCounts {
    pub source_count: usize,
    pub failed_source_count: usize,
    pub raw_record_count: usize,
    pub empty_key_discarded: usize,
    pub duplicates_discarded: usize,
    pub upgrades: usize,
    pub identified_count: usize,
    pub unidentified_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputOutcome {
    pub partition: String,
    pub path: String,
    pub question_count: usize,
    pub status: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub command: String,
    pub locale: String,
    pub started_at: String,
    pub finished_at: String,
    pub sources: Vec<SourceOutcome>,
    pub counts: RunCounts,
    pub outputs: Vec<OutputOutcome>,
    pub warnings: Vec<String>,
}
