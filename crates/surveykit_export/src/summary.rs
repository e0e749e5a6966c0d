//! Token extraction from free-text analysis summaries.
//!
//! Summaries sometimes embed a quoted learner type (`'Explorer'`) and a
//! `Level N` marker. Both are recovered with plain substring heuristics and
//! are absent when the text does not follow that shape.

const L_QUOTE_PAIRS: [(char, char); 4] = [('\'', '\''), ('"', '"'), ('‘', '’'), ('“', '”')];
const C_LEVEL_MARKER: &str = "Level ";

/// Optional fields recovered from a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryTokens {
    pub learner_type: Option<String>,
    pub level: Option<String>,
}

/// Extract the learner type and `Level N` token from `summary`.
pub fn extract_summary_tokens(summary: &str) -> SummaryTokens {
    SummaryTokens {
        learner_type: extract_learner_type(summary),
        level: extract_level(summary),
    }
}

/// Text between the earliest opening quote and its closing partner.
fn extract_learner_type(summary: &str) -> Option<String> {
    let (n_idx_open, chr_open, chr_close) = L_QUOTE_PAIRS
        .iter()
        .filter_map(|(chr_open, chr_close)| {
            summary
                .find(*chr_open)
                .map(|n_idx| (n_idx, *chr_open, *chr_close))
        })
        .min_by_key(|(n_idx, _, _)| *n_idx)?;

    let c_rest = &summary[n_idx_open + chr_open.len_utf8()..];
    let n_idx_close = c_rest.find(chr_close)?;
    let c_token = c_rest[..n_idx_close].trim();
    (!c_token.is_empty()).then(|| c_token.to_string())
}

/// `Level N` from the digit run after the first `Level ` marker.
fn extract_level(summary: &str) -> Option<String> {
    let n_idx = summary.find(C_LEVEL_MARKER)?;
    let c_digits: String = summary[n_idx + C_LEVEL_MARKER.len()..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    (!c_digits.is_empty()).then(|| format!("{C_LEVEL_MARKER}{c_digits}"))
}
