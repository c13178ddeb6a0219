//! CSV parsing and question/answer column detection.
//!
//! Sheet exports come with arbitrary header rows. A column whose normalized
//! header contains one of the question keywords (English or Arabic) holds
//! the questions; same scheme for answers. Sources where either role is
//! missing are rejected and the caller skips them.

use csv::ReaderBuilder;
use sheetfaq_shared::{QaTable, Result, SheetFaqError, normalize};

/// Header substrings selecting the question column.
const QUESTION_KEYWORDS: &[&str] = &["question", "سؤال"];

/// Header substrings selecting the answer column. Both Arabic spellings
/// (with and without hamza) appear in real sheets.
const ANSWER_KEYWORDS: &[&str] = &["answer", "اجابة", "إجابة"];

// ---------------------------------------------------------------------------
// Column detection
// ---------------------------------------------------------------------------

/// Detected column indexes for the two roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRoles {
    /// Index of the question column.
    pub question: usize,
    /// Index of the answer column.
    pub answer: usize,
}

/// Scan normalized headers for the question/answer keyword sets.
///
/// The first matching column wins per role, and a header claimed for the
/// question role is not considered for the answer role. Returns `None` when
/// either role is missing.
pub fn detect_columns(headers: &[String]) -> Option<ColumnRoles> {
    let mut question = None;
    let mut answer = None;

    for (idx, header) in headers.iter().enumerate() {
        let header = normalize(header);
        if question.is_none() && QUESTION_KEYWORDS.iter().any(|k| header.contains(k)) {
            question = Some(idx);
        } else if answer.is_none() && ANSWER_KEYWORDS.iter().any(|k| header.contains(k)) {
            answer = Some(idx);
        }
    }

    match (question, answer) {
        (Some(question), Some(answer)) => Some(ColumnRoles { question, answer }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Row ingestion
// ---------------------------------------------------------------------------

/// Parse CSV bytes and insert every usable row into `table`.
///
/// Rows missing either cell are skipped silently; rows with both cells are
/// inserted with the normalized question as key, overwriting earlier
/// entries. A record error rejects the whole source: rows are buffered
/// locally and merged into `table` only after the entire file parses, so a
/// skipped source contributes nothing. Returns the number of rows ingested.
pub fn ingest_csv(data: &[u8], table: &mut QaTable) -> Result<usize> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(data);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| SheetFaqError::csv(format!("invalid header row: {e}")))?
        .iter()
        .map(str::to_string)
        .collect();

    let roles = detect_columns(&headers).ok_or_else(|| {
        SheetFaqError::csv(format!(
            "missing question/answer columns in header: {headers:?}"
        ))
    })?;

    let mut parsed = QaTable::new();
    let mut rows = 0;
    for record in reader.records() {
        let record = record.map_err(|e| SheetFaqError::csv(format!("bad record: {e}")))?;

        let question = record.get(roles.question).unwrap_or("");
        let answer = record.get(roles.answer).unwrap_or("");
        if question.trim().is_empty() || answer.trim().is_empty() {
            continue;
        }

        parsed.insert(question, answer);
        rows += 1;
    }

    for (question, answer) in parsed.entries() {
        table.insert(question, answer);
    }

    Ok(rows)
}
