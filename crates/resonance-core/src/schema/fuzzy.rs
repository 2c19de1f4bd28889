//! Header matching ladder: exact, known-typo, fuzzy.
//!
//! Two separate lookup paths enforce the contamination guard: data columns
//! (prominence, sentiment, description, quality score) may resolve through
//! the full ladder including fuzzy similarity, while state/modifier label
//! columns stop after the known-typo step. There is no code path by which a
//! label column can bind fuzzily.

use serde::{Deserialize, Serialize};

/// Minimum normalized similarity for a fuzzy data-column match.
pub const FUZZY_THRESHOLD: f64 = 0.8;

// ============================================================================
// TYPO NORMALIZATION
// ============================================================================

/// Normalize a header for data-column comparison.
///
/// Applies the full set of tolerated drift: misspelled prefixes, quality
/// score case variants, doubled underscores, pluralized modifier suffix,
/// trailing whitespace.
pub fn normalize_data(name: &str) -> String {
    let mut s = normalize_label(name);
    s = s.replace("Qulaity_", "Quality_");
    s = s.replace("Quality_score", "Quality_Score");
    s = s.replace("Quality score", "Quality_Score");
    while s.contains("__") {
        s = s.replace("__", "_");
    }
    s
}

/// Normalize a header for label-column comparison.
///
/// Only prefix misspellings, the pluralized modifier suffix, and trailing
/// whitespace are tolerated. Doubled underscores are NOT collapsed here:
/// `Entity_X__State` must never bind as entity X's state column.
pub fn normalize_label(name: &str) -> String {
    let mut s = name.trim_end().to_string();
    if let Some(rest) = s.strip_prefix("Enity_") {
        s = format!("Entity_{rest}");
    }
    if let Some(rest) = s.strip_prefix("Narrtaive_") {
        s = format!("Narrative_{rest}");
    }
    if let Some(stripped) = s.strip_suffix("_Modifiers") {
        s = format!("{stripped}_Modifier");
    }
    s
}

// ============================================================================
// HEADER INDEX
// ============================================================================

/// How a physical column was matched to a logical field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Header equals the expected name byte-for-byte
    Exact,
    /// Header equals the expected name after known-typo normalization
    Normalized,
    /// Header cleared the similarity threshold (data columns only)
    Fuzzy,
}

/// A resolved physical column together with how it matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMatch {
    /// Physical column name as it appears in the input
    pub column: String,
    /// Match provenance
    pub kind: MatchKind,
}

impl ColumnMatch {
    /// Human-readable substitution note, or `None` for an exact match.
    pub fn substitution_note(&self, wanted: &str) -> Option<String> {
        match self.kind {
            MatchKind::Exact => None,
            MatchKind::Normalized => Some(format!(
                "tolerated header drift: \"{}\" bound as \"{wanted}\"",
                self.column
            )),
            MatchKind::Fuzzy => Some(format!(
                "fuzzy match: \"{}\" bound as \"{wanted}\"",
                self.column
            )),
        }
    }
}

/// Lookup over the input header row.
#[derive(Debug, Clone)]
pub struct HeaderIndex {
    headers: Vec<String>,
}

impl HeaderIndex {
    /// Build an index over the header row, preserving order.
    pub fn new(headers: &[String]) -> Self {
        Self {
            headers: headers.to_vec(),
        }
    }

    /// All headers in input order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    fn find_exact(&self, wanted: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.as_str() == wanted)
            .map(|h| h.as_str())
    }

    /// Resolve a data column through exact and known-typo steps only.
    ///
    /// Used for optional variants (e.g. the `Super_Prominence` probe) where a
    /// fuzzy hit on the plain sibling column would be a false positive.
    pub fn find_data_column_known(&self, wanted: &str) -> Option<ColumnMatch> {
        if let Some(hit) = self.find_exact(wanted) {
            return Some(ColumnMatch {
                column: hit.to_string(),
                kind: MatchKind::Exact,
            });
        }

        let wanted_norm = normalize_data(wanted);
        self.headers
            .iter()
            .find(|h| normalize_data(h) == wanted_norm)
            .map(|hit| ColumnMatch {
                column: hit.clone(),
                kind: MatchKind::Normalized,
            })
    }

    /// Resolve a data column: exact, then known-typo, then fuzzy at
    /// [`FUZZY_THRESHOLD`]. Fuzzy candidates that look like state or
    /// modifier columns are excluded outright.
    pub fn find_data_column(&self, wanted: &str) -> Option<ColumnMatch> {
        if let Some(hit) = self.find_data_column_known(wanted) {
            return Some(hit);
        }

        let wanted_norm = normalize_data(wanted);
        let mut best: Option<(&String, f64)> = None;
        for header in &self.headers {
            let header_norm = normalize_data(header);
            if header_norm.ends_with("_State") || header_norm.ends_with("_Modifier") {
                continue;
            }
            let score = strsim::normalized_levenshtein(&header_norm, &wanted_norm);
            if score >= FUZZY_THRESHOLD && best.is_none_or(|(_, s)| score > s) {
                best = Some((header, score));
            }
        }
        best.map(|(header, _)| ColumnMatch {
            column: header.clone(),
            kind: MatchKind::Fuzzy,
        })
    }

    /// Resolve a state/modifier label column: exact, then known-typo. Never
    /// fuzzy — a near-miss label column stays unbound.
    pub fn find_label_column(&self, wanted: &str) -> Option<ColumnMatch> {
        if let Some(hit) = self.find_exact(wanted) {
            return Some(ColumnMatch {
                column: hit.to_string(),
                kind: MatchKind::Exact,
            });
        }

        let wanted_norm = normalize_label(wanted);
        self.headers
            .iter()
            .find(|h| normalize_label(h) == wanted_norm)
            .map(|hit| ColumnMatch {
                column: hit.clone(),
                kind: MatchKind::Normalized,
            })
    }
}

// ============================================================================
// TESTS
// ============================================================================
