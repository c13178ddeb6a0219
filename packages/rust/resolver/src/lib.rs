//! Three-tier answer resolution: exact, keyword substring, fuzzy token-sort.
//!
//! The first tier that produces a result wins:
//! 1. Exact: the normalized query is a table key.
//! 2. Keyword: a query token longer than `min_token_len` occurs as a
//!    substring of a key. Each matching entry is listed once, up to
//!    `keyword_limit`.
//! 3. Fuzzy: the best key under token-order-insensitive similarity,
//!    accepted only above `fuzzy_threshold`.
//!
//! Resolution is pure: no state is touched, one reply per query.

use sheetfaq_shared::{MatchingConfig, MessagesConfig, QaTable, normalize};
use strsim::normalized_levenshtein;
use tracing::debug;

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Outcome of running a query through the three tiers.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The query equals a table key after normalization.
    Exact { answer: String },
    /// One or more keys contain a query token; listed in key order.
    Keyword { matches: Vec<(String, String)> },
    /// Best fuzzy candidate above the threshold.
    Fuzzy {
        question: String,
        answer: String,
        score: f64,
    },
    /// Nothing matched; render the configured no-answer message.
    NoMatch,
}

/// A reply payload ready for the transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// The message text.
    pub text: String,
    /// Whether the text uses Markdown emphasis (keyword listings only).
    pub markdown: bool,
}

// ---------------------------------------------------------------------------
// Resolution tiers
// ---------------------------------------------------------------------------

/// Resolve a raw query against the table.
pub fn resolve(query: &str, table: &QaTable, matching: &MatchingConfig) -> Resolution {
    let query = normalize(query);

    if let Some(answer) = table.get(&query) {
        debug!(%query, "exact match");
        return Resolution::Exact {
            answer: answer.to_string(),
        };
    }

    let matches = keyword_matches(&query, table, matching);
    if !matches.is_empty() {
        debug!(%query, count = matches.len(), "keyword match");
        return Resolution::Keyword { matches };
    }

    if let Some((question, answer, score)) = fuzzy_best(&query, table) {
        if score > matching.fuzzy_threshold {
            debug!(%query, %question, score, "fuzzy match");
            return Resolution::Fuzzy {
                question,
                answer,
                score,
            };
        }
        debug!(%query, score, "best fuzzy candidate below threshold");
    }

    Resolution::NoMatch
}

/// Collect table entries whose key contains at least one qualifying query
/// token. The first qualifying token per entry settles that entry, so no
/// entry is listed twice.
fn keyword_matches(
    query: &str,
    table: &QaTable,
    matching: &MatchingConfig,
) -> Vec<(String, String)> {
    let tokens: Vec<&str> = query
        .split_whitespace()
        .filter(|t| t.chars().count() > matching.min_token_len)
        .collect();

    if tokens.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (question, answer) in table.entries() {
        if tokens.iter().any(|t| question.contains(t)) {
            matches.push((question.to_string(), answer.to_string()));
            if matches.len() == matching.keyword_limit {
                break;
            }
        }
    }
    matches
}

/// Sort whitespace tokens before joining so word order does not affect the
/// score (the original bot's token_sort_ratio).
fn token_sort(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Token-order-insensitive similarity on a 0.0 to 1.0 scale.
fn token_sort_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&token_sort(a), &token_sort(b))
}

/// The highest-scoring key against the query, if the table has any.
fn fuzzy_best(query: &str, table: &QaTable) -> Option<(String, String, f64)> {
    table
        .entries()
        .map(|(q, a)| (q, a, token_sort_similarity(query, q)))
        .max_by(|x, y| x.2.total_cmp(&y.2))
        .map(|(q, a, score)| (q.to_string(), a.to_string(), score))
}

// ---------------------------------------------------------------------------
// Reply rendering
// ---------------------------------------------------------------------------

/// Render a resolution into the reply payload.
///
/// Exact and fuzzy matches reply with the bare answer, like the original
/// bot. Keyword matches produce the numbered question/answer listing with
/// Markdown emphasis.
pub fn render(resolution: &Resolution, messages: &MessagesConfig) -> Reply {
    match resolution {
        Resolution::Exact { answer } | Resolution::Fuzzy { answer, .. } => Reply {
            text: answer.clone(),
            markdown: false,
        },
        Resolution::Keyword { matches } => {
            let mut text = format!("{}\n\n", messages.multi_match_header);
            for (i, (question, answer)) in matches.iter().enumerate() {
                text.push_str(&format!(
                    "{}. 📝 *{}:* {}\n💡 *{}:* {}\n\n",
                    i + 1,
                    messages.question_label,
                    question,
                    messages.answer_label,
                    answer,
                ));
            }
            Reply {
                text,
                markdown: true,
            }
        }
        Resolution::NoMatch => Reply {
            text: messages.no_answer.clone(),
            markdown: false,
        },
    }
}
