/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::tokenizers::word::WordTokenizer;
use phf::{phf_map, phf_set};

/// Polarity in [-1, 1] and subjectivity in [0, 1] for a piece of text.
///
/// Scores come from a fixed word lexicon averaged over matches. They are a
/// coarse surface signal, not a semantic judgement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sentiment {
    pub polarity: f32,
    pub subjectivity: f32,
}

#[derive(Debug, thiserror::Error)]
#[error("sentiment analysis failed: {0}")]
pub struct SentimentError(pub String);

/// Black-box sentiment scoring over raw (non-normalized) text.
/// Capitalization and punctuation reach the implementation untouched.
pub trait SentimentAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Result<Sentiment, SentimentError>;
}

// Word -> (polarity, subjectivity).
static LEXICON: phf::Map<&'static str, (f32, f32)> = phf_map! {
    "good" => (0.7, 0.6),
    "great" => (0.8, 0.75),
    "excellent" => (1.0, 1.0),
    "amazing" => (0.6, 0.9),
    "awesome" => (1.0, 1.0),
    "wonderful" => (1.0, 1.0),
    "fantastic" => (0.4, 0.9),
    "love" => (0.5, 0.6),
    "loved" => (0.7, 0.8),
    "like" => (0.2, 0.3),
    "happy" => (0.8, 1.0),
    "glad" => (0.5, 1.0),
    "best" => (1.0, 0.3),
    "better" => (0.5, 0.5),
    "nice" => (0.6, 1.0),
    "beautiful" => (0.85, 1.0),
    "perfect" => (1.0, 1.0),
    "fun" => (0.3, 0.2),
    "enjoy" => (0.4, 0.5),
    "thanks" => (0.2, 0.2),
    "thank" => (0.2, 0.2),
    "welcome" => (0.5, 0.2),
    "lucky" => (0.6, 0.7),
    "winner" => (0.5, 0.6),
    "congratulations" => (0.7, 0.8),
    "congrats" => (0.7, 0.8),
    "free" => (0.4, 0.8),
    "guaranteed" => (0.5, 0.7),
    "exclusive" => (0.3, 0.6),
    "special" => (0.35, 0.55),
    "easy" => (0.4, 0.8),
    "new" => (0.1, 0.4),
    "bad" => (-0.7, 0.67),
    "terrible" => (-1.0, 1.0),
    "awful" => (-1.0, 1.0),
    "horrible" => (-1.0, 1.0),
    "worst" => (-1.0, 0.3),
    "worse" => (-0.5, 0.5),
    "hate" => (-0.8, 0.9),
    "sad" => (-0.5, 1.0),
    "angry" => (-0.5, 1.0),
    "annoying" => (-0.5, 0.6),
    "boring" => (-1.0, 1.0),
    "poor" => (-0.4, 0.6),
    "ugly" => (-0.7, 1.0),
    "stupid" => (-0.8, 0.9),
    "wrong" => (-0.5, 0.5),
    "fail" => (-0.5, 0.5),
    "failed" => (-0.5, 0.5),
    "problem" => (-0.3, 0.4),
    "sorry" => (-0.5, 1.0),
    "late" => (-0.3, 0.6),
    "risk" => (-0.4, 0.5),
    "urgent" => (-0.1, 0.6),
    "scam" => (-0.8, 0.9),
    "spam" => (-0.6, 0.8),
};

// Markers that invert the polarity of the following lexicon word.
static NEGATIONS: phf::Set<&'static str> = phf_set! {
    "not", "no", "never", "neither", "nor", "cannot", "without", "hardly",
    "cant", "dont", "wont", "isnt", "wasnt", "arent", "werent", "doesnt",
    "didnt", "couldnt", "shouldnt", "wouldnt", "hasnt", "havent", "hadnt",
    "don", "won", "isn", "wasn", "aren", "weren", "doesn", "didn",
    "couldn", "shouldn", "wouldn", "hasn", "haven", "hadn", "ain",
};

/// Fixed-lexicon analyzer: averages `(polarity, subjectivity)` over lexicon
/// hits; a negation marker directly before a hit scales its polarity by
/// -0.5. No hits scores neutral `(0.0, 0.0)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconAnalyzer;

impl LexiconAnalyzer {
    pub fn new() -> Self {
        LexiconAnalyzer
    }
}

impl SentimentAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Result<Sentiment, SentimentError> {
        let text = text.to_lowercase();
        let mut polarity_sum = 0.0f32;
        let mut subjectivity_sum = 0.0f32;
        let mut hits = 0usize;
        let mut negated = false;

        for token in WordTokenizer::new(&text) {
            if let Some(&(polarity, subjectivity)) = LEXICON.get(token) {
                polarity_sum += if negated { polarity * -0.5 } else { polarity };
                subjectivity_sum += subjectivity;
                hits += 1;
                negated = false;
            } else {
                negated = NEGATIONS.contains(token);
            }
        }

        if hits == 0 {
            return Ok(Sentiment::default());
        }

        Ok(Sentiment {
            polarity: (polarity_sum / hits as f32).clamp(-1.0, 1.0),
            subjectivity: (subjectivity_sum / hits as f32).clamp(0.0, 1.0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{LexiconAnalyzer, SentimentAnalyzer};

    #[test]
    fn lexicon_polarity() {
        let analyzer = LexiconAnalyzer::new();

        let positive = analyzer.analyze("What a great, wonderful day!").unwrap();
        assert!(positive.polarity > 0.0);
        assert!(positive.subjectivity > 0.0);

        let negative = analyzer.analyze("This is terrible and I hate it").unwrap();
        assert!(negative.polarity < 0.0);

        let neutral = analyzer.analyze("The meeting starts at noon").unwrap();
        assert_eq!(neutral.polarity, 0.0);
        assert_eq!(neutral.subjectivity, 0.0);

        let empty = analyzer.analyze("").unwrap();
        assert_eq!(empty.polarity, 0.0);
        assert_eq!(empty.subjectivity, 0.0);
    }

    #[test]
    fn negation_inverts_polarity() {
        let analyzer = LexiconAnalyzer::new();

        let plain = analyzer.analyze("good").unwrap();
        let negated = analyzer.analyze("not good").unwrap();
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert!((negated.polarity - plain.polarity * -0.5).abs() < 1e-6);
    }

    #[test]
    fn bounds() {
        let analyzer = LexiconAnalyzer::new();
        for text in [
            "excellent awesome wonderful perfect best",
            "terrible awful horrible worst boring",
            "Congratulations! You have won a free lottery ticket.",
        ] {
            let sentiment = analyzer.analyze(text).unwrap();
            assert!((-1.0..=1.0).contains(&sentiment.polarity));
            assert!((0.0..=1.0).contains(&sentiment.subjectivity));
        }
    }
}
