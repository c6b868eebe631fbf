//! Shapes a transcript document into the text block a criterion prompt sees.
//!
//! The two rubrics prefer different sources: opportunity scoring works best
//! from enhanced notes (with the raw transcript as a supplement when the
//! notes are thin), while sales coaching needs the verbatim transcript to
//! judge what the rep actually said.

use crate::transcript::{Note, TranscriptDocument};

const MIN_USEFUL_CONTENT: usize = 100;
const THIN_NOTES_THRESHOLD: usize = 1000;
const OPPORTUNITY_TRANSCRIPT_LIMIT: usize = 3000;
const SALES_TRANSCRIPT_LIMIT: usize = 8000;

/// Context for the opportunity rubric. Prefers enhanced notes, falling back
/// to structured note lines, supplementing with a truncated transcript when
/// the notes alone are thin.
pub fn format_opportunity_context(doc: &TranscriptDocument) -> String {
    let mut sections = vec![header(doc)];

    let enhanced = doc.enhanced_notes.as_deref().unwrap_or("");
    let transcript = doc.full_transcript.as_deref().unwrap_or("");

    if enhanced.len() > MIN_USEFUL_CONTENT {
        sections.push(format!("MEETING NOTES:\n{enhanced}"));
        if enhanced.len() < THIN_NOTES_THRESHOLD && !transcript.is_empty() {
            sections.push(format!(
                "TRANSCRIPT EXCERPT:\n{}",
                truncate(transcript, OPPORTUNITY_TRANSCRIPT_LIMIT)
            ));
        }
    } else if !doc.notes.is_empty() {
        sections.push(format!("MEETING NOTES:\n{}", note_lines(&doc.notes)));
    } else if !transcript.is_empty() {
        sections.push(format!(
            "TRANSCRIPT:\n{}",
            truncate(transcript, SALES_TRANSCRIPT_LIMIT)
        ));
    }

    sections.join("\n\n")
}

/// Context for the sales rubric. Prefers the verbatim transcript, falling
/// back to notes only when no usable transcript exists.
pub fn format_sales_context(doc: &TranscriptDocument) -> String {
    let mut sections = vec![header(doc)];

    let enhanced = doc.enhanced_notes.as_deref().unwrap_or("");
    let transcript = doc.full_transcript.as_deref().unwrap_or("");

    if transcript.len() > MIN_USEFUL_CONTENT {
        sections.push(format!(
            "TRANSCRIPT:\n{}",
            truncate(transcript, SALES_TRANSCRIPT_LIMIT)
        ));
    } else if enhanced.len() > MIN_USEFUL_CONTENT {
        sections.push(format!("MEETING NOTES:\n{enhanced}"));
    } else if !doc.notes.is_empty() {
        sections.push(format!("MEETING NOTES:\n{}", note_lines(&doc.notes)));
    }

    sections.join("\n\n")
}

/// Renders raw notes as "[timestamp] speaker: text" lines. Notes without a
/// timestamp or speaker keep their position with those parts omitted.
pub fn note_lines(notes: &[Note]) -> String {
    notes
        .iter()
        .map(|n| {
            let mut line = String::new();
            if let Some(t) = n.t.as_deref().filter(|t| !t.is_empty()) {
                line.push_str(&format!("[{t}] "));
            }
            if let Some(speaker) = n.speaker.as_deref().filter(|s| !s.is_empty()) {
                line.push_str(&format!("{speaker}: "));
            }
            line.push_str(&n.text);
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn header(doc: &TranscriptDocument) -> String {
    let mut lines = vec![format!(
        "MEETING: {}",
        doc.title.as_deref().unwrap_or("(untitled)")
    )];
    if let Some(date) = doc.date {
        lines.push(format!("DATE: {date}"));
    }
    if !doc.participants.is_empty() {
        lines.push(format!("PARTICIPANTS: {}", doc.participants.join(", ")));
    }
    lines.join("\n")
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    // Cut on a char boundary at or below the limit.
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...\n[Transcript truncated]", &text[..end])
}
