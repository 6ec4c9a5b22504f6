use super::technical::keyword_density;
use super::{round2, KeywordDensity, SignalExtractor};
use crate::error::AnalyzerError;
use crate::markup::ParsedPage;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

const TOP_KEYWORDS: usize = 5;
const VOWELS: &str = "aeiouyáéěíóúůý";

static SENTENCE_BOUNDARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadabilityLevel {
    VeryEasy,
    Easy,
    Moderate,
    Difficult,
    VeryDifficult,
}

impl ReadabilityLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 80.0 => ReadabilityLevel::VeryEasy,
            s if s >= 60.0 => ReadabilityLevel::Easy,
            s if s >= 40.0 => ReadabilityLevel::Moderate,
            s if s >= 20.0 => ReadabilityLevel::Difficult,
            _ => ReadabilityLevel::VeryDifficult,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadabilityLevel::VeryEasy => "very-easy",
            ReadabilityLevel::Easy => "easy",
            ReadabilityLevel::Moderate => "moderate",
            ReadabilityLevel::Difficult => "difficult",
            ReadabilityLevel::VeryDifficult => "very-difficult",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSignals {
    pub word_count: usize,
    pub sentence_count: usize,
    pub paragraph_count: usize,
    pub readability_score: f64,
    pub readability_level: ReadabilityLevel,
    pub avg_words_per_sentence: f64,
    pub top_keywords: Vec<KeywordDensity>,
}

impl ContentSignals {
    /// Record used whenever the text cannot be analyzed.
    pub fn fallback() -> Self {
        Self {
            word_count: 0,
            sentence_count: 0,
            paragraph_count: 0,
            readability_score: 50.0,
            readability_level: ReadabilityLevel::Moderate,
            avg_words_per_sentence: 0.0,
            top_keywords: Vec::new(),
        }
    }
}

impl Default for ContentSignals {
    fn default() -> Self {
        Self::fallback()
    }
}

pub struct ContentAnalyzer;

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Readability statistics for a block of plain text.
    pub fn analyze_text(
        &self,
        text: &str,
        paragraph_count: usize,
    ) -> Result<ContentSignals, AnalyzerError> {
        let words: Vec<&str> = text
            .split_whitespace()
            .filter(|w| w.chars().any(char::is_alphanumeric))
            .collect();

        if words.is_empty() {
            return Err(AnalyzerError::EmptyDocument);
        }

        let word_count = words.len();
        let sentence_count = SENTENCE_BOUNDARY
            .split(text)
            .filter(|fragment| !fragment.trim().is_empty())
            .count()
            .max(1);
        let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
        let readability_score = flesch_reading_ease(word_count, sentence_count, syllables);

        Ok(ContentSignals {
            word_count,
            sentence_count,
            paragraph_count,
            readability_score,
            readability_level: ReadabilityLevel::from_score(readability_score),
            avg_words_per_sentence: round2(word_count as f64 / sentence_count as f64),
            top_keywords: keyword_density(text, TOP_KEYWORDS),
        })
    }
}

impl SignalExtractor for ContentAnalyzer {
    type Signals = ContentSignals;

    fn name(&self) -> &str {
        "Content"
    }

    fn extract(&self, page: &ParsedPage) -> ContentSignals {
        let paragraph_count = page
            .select("p")
            .iter()
            .filter(|p| !ParsedPage::text(p).is_empty())
            .count();

        self.analyze_text(page.visible_text(), paragraph_count)
            .unwrap_or_else(|e| {
                log::warn!(
                    "Content analysis for {} fell back to defaults: {}",
                    page.url(),
                    e
                );
                ContentSignals::fallback()
            })
    }
}

/// Flesch Reading Ease, clamped to 0..=100 and rounded to two decimals.
/// Word and sentence counts are floored at one.
pub fn flesch_reading_ease(words: usize, sentences: usize, syllables: usize) -> f64 {
    let words = words.max(1) as f64;
    let sentences = sentences.max(1) as f64;
    let score = 206.835 - 1.015 * (words / sentences) - 84.6 * (syllables as f64 / words);
    round2(score.clamp(0.0, 100.0))
}

/// Vowel-group estimate: a trailing "e" is silent, a trailing "le" is not.
pub fn count_syllables(word: &str) -> usize {
    let word: String = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();

    let mut count: i32 = 0;
    let mut previous_was_vowel = false;
    for c in word.chars() {
        let is_vowel = VOWELS.contains(c);
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }

    if word.ends_with('e') {
        count -= 1;
    }
    if word.chars().count() > 2 && word.ends_with("le") {
        count += 1;
    }

    count.max(1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::{FetchResult, SiteProbes};
    use crate::markup::ResponseHeaders;

    #[test]
    fn test_syllable_estimates() {
        assert_eq!(count_syllables("cat"), 1);
        assert_eq!(count_syllables("the"), 1);
        assert_eq!(count_syllables("committee"), 2);
        assert_eq!(count_syllables("approved"), 3);
        assert_eq!(count_syllables("table"), 2);
        assert_eq!(count_syllables("budget."), 2);
        assert_eq!(count_syllables("123"), 1);
    }

    #[test]
    fn test_flesch_short_sentence_is_clamped() {
        // 206.835 - 1.015 * 6 - 84.6 * (6 / 6) = 116.145, clamped
        let signals = ContentAnalyzer::new()
            .analyze_text("The cat sat on the mat.", 1)
            .unwrap();
        assert_eq!(signals.word_count, 6);
        assert_eq!(signals.sentence_count, 1);
        assert_eq!(signals.readability_score, 100.0);
        assert_eq!(signals.readability_level, ReadabilityLevel::VeryEasy);
    }

    #[test]
    fn test_flesch_reference_value() {
        // syllables 1+2+3+1+2+2 = 11
        // 206.835 - 1.015 * 6 - 84.6 * 11 / 6 = 45.645
        let signals = ContentAnalyzer::new()
            .analyze_text("The committee approved the annual budget.", 1)
            .unwrap();
        assert!((signals.readability_score - 45.645).abs() < 0.01);
        assert_eq!(signals.readability_level, ReadabilityLevel::Moderate);
    }

    #[test]
    fn test_sentence_split_discards_empty_fragments() {
        let signals = ContentAnalyzer::new()
            .analyze_text("Wow!!! Really?! Yes... ok", 0)
            .unwrap();
        assert_eq!(signals.sentence_count, 4);
        assert_eq!(signals.word_count, 4);
        assert_eq!(signals.avg_words_per_sentence, 1.0);
    }

    #[test]
    fn test_readability_levels() {
        assert_eq!(
            ReadabilityLevel::from_score(85.0),
            ReadabilityLevel::VeryEasy
        );
        assert_eq!(ReadabilityLevel::from_score(60.0), ReadabilityLevel::Easy);
        assert_eq!(
            ReadabilityLevel::from_score(45.0),
            ReadabilityLevel::Moderate
        );
        assert_eq!(
            ReadabilityLevel::from_score(20.0),
            ReadabilityLevel::Difficult
        );
        assert_eq!(
            ReadabilityLevel::from_score(5.0),
            ReadabilityLevel::VeryDifficult
        );
    }

    #[test]
    fn test_empty_page_uses_fallback() {
        let fetch = FetchResult::from_markup(
            "https://example.com/",
            "<html><body><script>var a = 1;</script></body></html>",
            ResponseHeaders::new(),
        );
        let page = ParsedPage::parse(&fetch, SiteProbes::default());
        let signals = ContentAnalyzer::new().extract(&page);

        assert_eq!(signals, ContentSignals::fallback());
        assert_eq!(signals.word_count, 0);
        assert_eq!(signals.readability_score, 50.0);
        assert_eq!(signals.readability_level, ReadabilityLevel::Moderate);
    }

    #[test]
    fn test_extract_counts_paragraphs() {
        let fetch = FetchResult::from_markup(
            "https://example.com/",
            "<html><body><p>First paragraph here.</p><p> </p><p>Second one.</p></body></html>",
            ResponseHeaders::new(),
        );
        let page = ParsedPage::parse(&fetch, SiteProbes::default());
        let signals = ContentAnalyzer::new().extract(&page);

        assert_eq!(signals.paragraph_count, 2);
        assert_eq!(signals.word_count, 5);
        assert_eq!(signals.sentence_count, 2);
    }
}
