//! Lexical feature extraction: cheap textual signals the heuristic scorer is built on.

use serde::Serialize;

use crate::models::interview::JobCategory;
use crate::scoring::keywords::job_keywords;

/// Cues that the answer describes concrete experience.
const EXAMPLE_CUES: &[&str] = &["예를 들어", "예시", "경험", "프로젝트", "회사", "팀"];

/// Cues that the answer mentions a duration or point in time.
const TIMEFRAME_CUES: &[&str] = &["년", "개월", "주", "일", "기간", "동안"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Features {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_words_per_sentence: f64,
    pub keyword_matches: usize,
    pub has_numbers: bool,
    pub has_examples: bool,
    pub has_timeframe: bool,
}

/// Derives [`Features`] from a raw answer. Pure function of its inputs.
pub fn extract_features(
    answer: &str,
    category: JobCategory,
    custom_category: Option<&str>,
) -> Features {
    let word_count = answer.split_whitespace().count();
    let sentence_count = answer
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    let avg_words_per_sentence = word_count as f64 / sentence_count.max(1) as f64;

    let answer_lower = answer.to_lowercase();
    let keyword_matches = job_keywords(category, custom_category)
        .iter()
        .filter(|k| answer_lower.contains(&k.to_lowercase()))
        .count();

    Features {
        word_count,
        sentence_count,
        avg_words_per_sentence,
        keyword_matches,
        has_numbers: answer.chars().any(|c| c.is_ascii_digit()),
        has_examples: EXAMPLE_CUES.iter().any(|cue| answer.contains(cue)),
        has_timeframe: TIMEFRAME_CUES.iter().any(|cue| answer.contains(cue)),
    }
}
