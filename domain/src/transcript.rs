//! Canonical transcript document consumed by the scoring pipeline.
//!
//! Produced by the ingestion collaborator from note-taker exports. Immutable
//! once parsed; scoring reads it, never writes it.

use crate::error::{DomainErrorKind, Error, InternalErrorKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single raw note line, optionally timestamped and speaker-attributed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    #[serde(default)]
    pub t: Option<String>,
    #[serde(default)]
    pub speaker: Option<String>,
    pub text: String,
}

/// One meeting's worth of ingested transcript material.
///
/// `participants` is ordered; by convention the first participant is the
/// salesperson who owns the meeting.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptDocument {
    pub meeting_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub creator_name: Option<String>,
    #[serde(default)]
    pub creator_email: Option<String>,
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default)]
    pub enhanced_notes: Option<String>,
    #[serde(default)]
    pub my_notes: Option<String>,
    #[serde(default)]
    pub full_transcript: Option<String>,
}

impl TranscriptDocument {
    /// Parses a transcript export and validates the minimum the pipeline
    /// needs: a meeting identity and at least some text to score.
    pub fn from_json_str(raw: &str) -> Result<Self, Error> {
        let document: TranscriptDocument = serde_json::from_str(raw).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Extraction),
        })?;

        if document.meeting_id.trim().is_empty() {
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Extraction),
            });
        }
        if !document.has_content() {
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Extraction),
            });
        }

        Ok(document)
    }

    /// True when there is anything at all worth scoring
    pub fn has_content(&self) -> bool {
        self.full_transcript
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
            || self
                .enhanced_notes
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty())
            || self.notes.iter().any(|n| !n.text.trim().is_empty())
    }

    /// The salesperson who owns the meeting: the export's creator when
    /// present, otherwise the first participant by convention.
    pub fn salesperson_name(&self) -> Option<&str> {
        self.creator_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.participants.first().map(String::as_str))
    }
}
