//! Heuristic quality score for one OCR attempt.

use crate::engine::WordDetection;

const YIELD_WEIGHT: f64 = 8.0;
const LONG_WORD_BONUS: f64 = 2.0;
const SINGLE_CHAR_PENALTY: f64 = 3.0;
/// Words with at least this many characters earn the long-word bonus
const LONG_WORD_CHARS: usize = 4;

/// Score a filtered set of detections; higher is better.
///
/// Rewards mean confidence, a log-damped word count and longer tokens, and
/// penalizes isolated single characters (usually noise). Returns `None` when
/// there is nothing to score: no detections, or none with a known
/// (non-negative) confidence.
pub fn score_detections(words: &[WordDetection]) -> Option<f64> {
    let known: Vec<f64> = words
        .iter()
        .map(|w| f64::from(w.confidence))
        .filter(|&c| c >= 0.0)
        .collect();
    if known.is_empty() {
        return None;
    }

    let mean_conf = known.iter().sum::<f64>() / known.len() as f64;
    let count = words.len() as f64;

    let (mut long_words, mut single_chars) = (0usize, 0usize);
    for word in words {
        match word.text.chars().count() {
            1 => single_chars += 1,
            n if n >= LONG_WORD_CHARS => long_words += 1,
            _ => {}
        }
    }

    Some(
        mean_conf + YIELD_WEIGHT * count.ln_1p() + LONG_WORD_BONUS * long_words as f64
            - SINGLE_CHAR_PENALTY * single_chars as f64,
    )
}

/// Mean confidence over all detections, 0 when there are none
pub fn mean_confidence(words: &[WordDetection]) -> f64 {
    if words.is_empty() {
        return 0.0;
    }
    words.iter().map(|w| f64::from(w.confidence)).sum::<f64>() / words.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BoundingBox;

    fn word(text: &str, confidence: f32) -> WordDetection {
        WordDetection::new(text, confidence, BoundingBox::new(0, 0, 10, 10))
    }

    #[test]
    fn test_empty_has_no_score() {
        assert_eq!(score_detections(&[]), None);
        assert_eq!(score_detections(&[word("hello", -1.0)]), None);
    }

    #[test]
    fn test_score_formula() {
        let words = vec![word("hello", 90.0), word("ab", 70.0), word("x", 50.0)];
        let expected = 70.0 + 8.0 * 4f64.ln() + 2.0 - 3.0;
        let score = score_detections(&words).unwrap();
        assert!((score - expected).abs() < 1e-9, "{} vs {}", score, expected);
    }

    #[test]
    fn test_unknown_confidence_counts_toward_yield_only() {
        let known = score_detections(&[word("abc", 60.0)]).unwrap();
        let with_unknown = score_detections(&[word("abc", 60.0), word("abc", -1.0)]).unwrap();
        let expected_gain = 8.0 * (3f64.ln() - 2f64.ln());
        assert!((with_unknown - known - expected_gain).abs() < 1e-9);
    }

    #[test]
    fn test_long_confident_word_never_decreases_score() {
        let mut words = vec![word("alpha", 40.0), word("be", 80.0), word("c", 60.0)];
        for _ in 0..10 {
            let before = score_detections(&words).unwrap();
            let mean = mean_confidence(&words) as f32;
            words.push(word("longer", mean + 1.0));
            assert!(score_detections(&words).unwrap() >= before);
        }
    }

    #[test]
    fn test_single_char_never_increases_score() {
        // Holds once at least two words are present and the new token is no
        // more confident than the current mean
        let mut words = vec![word("alpha", 40.0), word("beta", 80.0)];
        for _ in 0..10 {
            let before = score_detections(&words).unwrap();
            let mean = mean_confidence(&words) as f32;
            words.push(word("x", mean));
            assert!(score_detections(&words).unwrap() <= before);
        }
        words.push(word("y", 20.0));
        let last = score_detections(&words[..words.len() - 1]).unwrap();
        assert!(score_detections(&words).unwrap() < last);
    }

    #[test]
    fn test_counts_unicode_characters() {
        // Four characters, more than four bytes
        let score = score_detections(&[word("häuß", 50.0)]).unwrap();
        let expected = 50.0 + 8.0 * 2f64.ln() + 2.0;
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_mean_confidence() {
        assert_eq!(mean_confidence(&[]), 0.0);
        assert_eq!(mean_confidence(&[word("a", 10.0), word("b", 30.0)]), 20.0);
    }
}
