//! Text normalization and 0-100 similarity scoring for product names and
//! free-text fields.

use clap::ValueEnum;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

// Word characters, whitespace and the Cyrillic block survive normalization.
static DISALLOWED_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\w\s\x{0400}-\x{04FF}]").expect("character class pattern is valid")
});

const EDGE_PUNCTUATION: &[char] = &[
    '.', ',', '!', '?', ';', ':', '-', '(', ')', '[', ']', '{', '}', '"', '\'',
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMethod {
    /// Best of ratio, partial ratio, token-sort and token-set ratios.
    #[default]
    Fuzzy,
    /// Single matching-block ratio over characters.
    Sequence,
}

impl std::fmt::Display for SimilarityMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimilarityMethod::Fuzzy => write!(f, "fuzzy"),
            SimilarityMethod::Sequence => write!(f, "sequence"),
        }
    }
}

/// Lowercase, collapse whitespace, strip edge punctuation and drop anything
/// that is not a word character, whitespace or Cyrillic.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    if lowered.is_empty() {
        return String::new();
    }
    let collapsed = WHITESPACE_RUN.replace_all(&lowered, " ");
    let stripped = collapsed.trim_matches(EDGE_PUNCTUATION);
    DISALLOWED_CHARS.replace_all(stripped, "").into_owned()
}

/// Similarity between two raw strings in `[0, 100]`.
///
/// Two empty strings are identical; one empty string never matches anything.
pub fn similarity_score(left: &str, right: &str, method: SimilarityMethod) -> f64 {
    if left.is_empty() && right.is_empty() {
        return 100.0;
    }
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let left_norm = normalize_text(left);
    let right_norm = normalize_text(right);
    if left_norm == right_norm {
        return 100.0;
    }

    let score = match method {
        SimilarityMethod::Fuzzy => {
            let breakdown = fuzzy_scores(&left_norm, &right_norm);
            tracing::trace!(
                left = left,
                right = right,
                ratio = breakdown.ratio,
                partial = breakdown.partial_ratio,
                token_sort = breakdown.token_sort_ratio,
                token_set = breakdown.token_set_ratio,
                "fuzzy comparison"
            );
            breakdown.best()
        }
        SimilarityMethod::Sequence => sequence_ratio(&left_norm, &right_norm),
    };

    score.clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FuzzyScores {
    pub ratio: f64,
    pub partial_ratio: f64,
    pub token_sort_ratio: f64,
    pub token_set_ratio: f64,
}

impl FuzzyScores {
    pub fn best(&self) -> f64 {
        self.ratio
            .max(self.partial_ratio)
            .max(self.token_sort_ratio)
            .max(self.token_set_ratio)
    }
}

/// Per-metric scores for two already-normalized strings.
pub fn fuzzy_scores(left: &str, right: &str) -> FuzzyScores {
    FuzzyScores {
        ratio: ratio(left, right),
        partial_ratio: partial_ratio(left, right),
        token_sort_ratio: token_sort_ratio(left, right),
        token_set_ratio: token_set_ratio(left, right),
    }
}

/// Full report of how two raw strings compare, used by the `compare` command.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityBreakdown {
    pub left: String,
    pub right: String,
    pub normalized_left: String,
    pub normalized_right: String,
    pub fuzzy: FuzzyScores,
    pub sequence: f64,
    pub score: f64,
    pub method: SimilarityMethod,
}

pub fn similarity_breakdown(left: &str, right: &str, method: SimilarityMethod) -> SimilarityBreakdown {
    let normalized_left = normalize_text(left);
    let normalized_right = normalize_text(right);
    SimilarityBreakdown {
        left: left.to_string(),
        right: right.to_string(),
        fuzzy: fuzzy_scores(&normalized_left, &normalized_right),
        sequence: sequence_ratio(&normalized_left, &normalized_right),
        score: similarity_score(left, right, method),
        normalized_left,
        normalized_right,
        method,
    }
}

/// InDel ratio: `2 * LCS / (|a| + |b|)` scaled to 100.
pub fn ratio(left: &str, right: &str) -> f64 {
    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();
    chars_ratio(&left_chars, &right_chars)
}

fn chars_ratio(left: &[char], right: &[char]) -> f64 {
    let total = left.len() + right.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = lcs_len(left, right);
    200.0 * lcs as f64 / total as f64
}

fn lcs_len(left: &[char], right: &[char]) -> usize {
    if left.is_empty() || right.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; right.len() + 1];
    let mut curr = vec![0usize; right.len() + 1];
    for lc in left {
        for (j, rc) in right.iter().enumerate() {
            curr[j + 1] = if lc == rc {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[right.len()]
}

/// Best ratio of the shorter string against every alignment inside the longer
/// one, including windows that hang off either end. Equal-length strings are
/// tried in both roles.
pub fn partial_ratio(left: &str, right: &str) -> f64 {
    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();
    let (short, long) = if left_chars.len() <= right_chars.len() {
        (left_chars, right_chars)
    } else {
        (right_chars, left_chars)
    };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let best = best_alignment(&short, &long);
    if best < 100.0 && short.len() == long.len() {
        return best.max(best_alignment(&long, &short));
    }
    best
}

fn best_alignment(short: &[char], long: &[char]) -> f64 {
    let m = short.len();
    let n = long.len();
    let mut best: f64 = 0.0;

    for start in 0..=(n - m) {
        best = best.max(chars_ratio(short, &long[start..start + m]));
        if best >= 100.0 {
            return 100.0;
        }
    }
    for len in 1..m {
        best = best.max(chars_ratio(short, &long[..len]));
        best = best.max(chars_ratio(short, &long[n - len..]));
    }
    best
}

fn sorted_tokens(text: &str) -> Vec<&str> {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens
}

pub fn token_sort_ratio(left: &str, right: &str) -> f64 {
    ratio(&sorted_tokens(left).join(" "), &sorted_tokens(right).join(" "))
}

pub fn token_set_ratio(left: &str, right: &str) -> f64 {
    let mut left_tokens = sorted_tokens(left);
    let mut right_tokens = sorted_tokens(right);
    left_tokens.dedup();
    right_tokens.dedup();
    if left_tokens.is_empty() || right_tokens.is_empty() {
        return 0.0;
    }

    let intersection: Vec<&str> = left_tokens
        .iter()
        .copied()
        .filter(|token| right_tokens.binary_search(token).is_ok())
        .collect();
    let left_only: Vec<&str> = left_tokens
        .iter()
        .copied()
        .filter(|token| intersection.binary_search(token).is_err())
        .collect();
    let right_only: Vec<&str> = right_tokens
        .iter()
        .copied()
        .filter(|token| intersection.binary_search(token).is_err())
        .collect();

    if !intersection.is_empty() && (left_only.is_empty() || right_only.is_empty()) {
        return 100.0;
    }

    let sect = intersection.join(" ");
    let join_with_sect = |rest: &[&str]| {
        if sect.is_empty() {
            rest.join(" ")
        } else {
            format!("{} {}", sect, rest.join(" "))
        }
    };
    let combined_left = join_with_sect(&left_only);
    let combined_right = join_with_sect(&right_only);

    let mut best = ratio(&combined_left, &combined_right);
    if !sect.is_empty() {
        best = best
            .max(ratio(&sect, &combined_left))
            .max(ratio(&sect, &combined_right));
    }
    best
}

/// Ratcliff/Obershelp matching-block ratio scaled to 100.
pub fn sequence_ratio(left: &str, right: &str) -> f64 {
    let left_chars: Vec<char> = left.chars().collect();
    let right_chars: Vec<char> = right.chars().collect();
    let total = left_chars.len() + right_chars.len();
    if total == 0 {
        return 100.0;
    }
    let matched = matching_chars(&left_chars, &right_chars);
    200.0 * matched as f64 / total as f64
}

fn matching_chars(left: &[char], right: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, left.len(), 0, right.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(left, right, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

// Earliest longest common block within the given ranges; ties go to the block
// that starts first in `left`, then first in `right`.
fn longest_match(
    left: &[char],
    right: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            curr[slot] = if left[i] == right[j] { prev[slot - 1] + 1 } else { 0 };
            if curr[slot] > best_k {
                best_k = curr[slot];
                best_i = i + 1 - best_k;
                best_j = j + 1 - best_k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
        curr.iter_mut().for_each(|v| *v = 0);
    }

    (best_i, best_j, best_k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_text("  М'ячі   ФУТБОЛЬНІ. "), "мячі футбольні");
        assert_eq!(normalize_text("(Select #5)"), "select 5");
        assert_eq!(normalize_text("..."), "");
    }

    #[test]
    fn sequence_ratio_matches_known_value() {
        // "abcd" vs "bcde": one block "bcd" of 3 chars, 2*3/8.
        assert!((sequence_ratio("abcd", "bcde") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn token_set_ratio_is_full_for_subset() {
        assert_eq!(token_set_ratio("мяч футбольний", "мяч футбольний select"), 100.0);
    }
}
