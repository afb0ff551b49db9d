/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{ClassifierError, error::Result};
use nlp::sentiment::SentimentAnalyzer;
use phf::phf_set;
use serde::{Deserialize, Serialize};

/// Number of structural/statistical features per message.
pub const META_DIM: usize = 6;

// Fixed keyword set; configuration, not learned.
static SPAM_KEYWORDS: phf::Set<&'static str> = phf_set! {
    "free", "win", "winner", "cash", "prize", "urgent", "claim",
    "congrats", "guaranteed", "call", "loans", "risk", "investment",
};

/// Extracts `[length, caps_ratio, punct_count, polarity, subjectivity,
/// spam_keyword_density]` from raw (non-normalized) text.
///
/// Batch-oriented: single messages are batches of one, so training-time
/// and inference-time calls share one code path and produce numerically
/// identical results for the same text. Denominators that would be zero
/// are floored to 1; degenerate input never fails.
pub struct MetaFeatureExtractor<'x> {
    analyzer: &'x dyn SentimentAnalyzer,
}

impl<'x> MetaFeatureExtractor<'x> {
    pub fn new(analyzer: &'x dyn SentimentAnalyzer) -> Self {
        MetaFeatureExtractor { analyzer }
    }

    pub fn extract(&self, texts: &[&str]) -> Result<Vec<[f32; META_DIM]>> {
        texts.iter().map(|text| self.extract_one(text)).collect()
    }

    fn extract_one(&self, text: &str) -> Result<[f32; META_DIM]> {
        let length = text.chars().count().max(1) as f32;
        let caps_count = text.chars().filter(|c| c.is_uppercase()).count() as f32;
        let punct_count = text.chars().filter(|c| c.is_ascii_punctuation()).count() as f32;

        let sentiment = self
            .analyzer
            .analyze(text)
            .map_err(|err| ClassifierError::UpstreamFeature(err.to_string()))?;

        let lowercase = text.to_lowercase();
        let words = lowercase.split_whitespace().collect::<Vec<_>>();
        let keyword_count = words
            .iter()
            .filter(|word| SPAM_KEYWORDS.contains(**word))
            .count() as f32;
        let word_count = words.len().max(1) as f32;

        Ok([
            length,
            caps_count / length,
            punct_count,
            sentiment.polarity,
            sentiment.subjectivity,
            keyword_count / word_count,
        ])
    }
}

/// Per-dimension standardization (zero mean, unit variance) learned at fit
/// time and applied unchanged at inference. A dimension with no variance
/// keeps a unit scale.
#[derive(Debug, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: [f32; META_DIM],
    std: [f32; META_DIM],
}

impl StandardScaler {
    pub fn fit(rows: &[[f32; META_DIM]]) -> Result<Self> {
        if rows.is_empty() {
            return Err(ClassifierError::EmptyCorpus);
        }

        let n = rows.len() as f32;
        let mut mean = [0.0f32; META_DIM];
        let mut std = [0.0f32; META_DIM];

        for row in rows {
            for (i, value) in row.iter().enumerate() {
                mean[i] += value;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        for row in rows {
            for (i, value) in row.iter().enumerate() {
                let delta = value - mean[i];
                std[i] += delta * delta;
            }
        }
        for s in &mut std {
            *s = (*s / n).sqrt();
            if *s < f32::EPSILON {
                *s = 1.0;
            }
        }

        Ok(StandardScaler { mean, std })
    }

    pub fn transform(&self, row: &[f32; META_DIM]) -> [f32; META_DIM] {
        let mut scaled = [0.0f32; META_DIM];
        for i in 0..META_DIM {
            scaled[i] = (row[i] - self.mean[i]) / self.std[i];
        }
        scaled
    }
}

#[cfg(test)]
mod tests {
    use super::{MetaFeatureExtractor, StandardScaler};
    use nlp::sentiment::LexiconAnalyzer;

    #[test]
    fn empty_text_is_floored() {
        let analyzer = LexiconAnalyzer::new();
        let extractor = MetaFeatureExtractor::new(&analyzer);

        let features = extractor.extract(&[""]).unwrap();
        assert_eq!(features[0], [1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn caps_ratio_bounds_and_monotonicity() {
        let analyzer = LexiconAnalyzer::new();
        let extractor = MetaFeatureExtractor::new(&analyzer);

        let mut previous = 0.0f32;
        for text in ["call me now", "Call me now", "CAll me now", "CALL ME NOW"] {
            let row = extractor.extract(&[text]).unwrap()[0];
            let caps_ratio = row[1];
            assert!((0.0..=1.0).contains(&caps_ratio), "{text}");
            assert!(caps_ratio >= previous, "{text}");
            previous = caps_ratio;
        }
    }

    #[test]
    fn keyword_density() {
        let analyzer = LexiconAnalyzer::new();
        let extractor = MetaFeatureExtractor::new(&analyzer);

        let row = extractor.extract(&["win cash now"]).unwrap()[0];
        assert!((row[5] - 2.0 / 3.0).abs() < 1e-6);

        let row = extractor.extract(&["see you at noon"]).unwrap()[0];
        assert_eq!(row[5], 0.0);

        for text in ["FREE CASH PRIZE", "free", "nothing suspicious here"] {
            let density = extractor.extract(&[text]).unwrap()[0][5];
            assert!((0.0..=1.0).contains(&density), "{text}");
        }
    }

    #[test]
    fn punctuation_count() {
        let analyzer = LexiconAnalyzer::new();
        let extractor = MetaFeatureExtractor::new(&analyzer);

        let row = extractor.extract(&["Hello!!! How are you?"]).unwrap()[0];
        assert_eq!(row[2], 4.0);
    }

    #[test]
    fn batch_and_single_parity() {
        let analyzer = LexiconAnalyzer::new();
        let extractor = MetaFeatureExtractor::new(&analyzer);

        let texts = [
            "Congratulations! You have won a free lottery ticket.",
            "Let's meet for lunch tomorrow at noon.",
            "",
        ];
        let batch = extractor.extract(&texts).unwrap();
        for (i, text) in texts.iter().enumerate() {
            let single = extractor.extract(&[text]).unwrap();
            assert_eq!(single[0], batch[i]);
        }
    }

    #[test]
    fn scaler_standardizes() {
        let rows = vec![
            [10.0, 0.0, 1.0, -0.5, 0.5, 0.0],
            [20.0, 0.5, 3.0, 0.0, 0.5, 0.5],
            [30.0, 1.0, 5.0, 0.5, 0.5, 1.0],
        ];
        let scaler = StandardScaler::fit(&rows).unwrap();

        // Middle row sits on the mean for every dimension; the constant
        // subjectivity column gets a unit scale, not a division by zero.
        let scaled = scaler.transform(&rows[1]);
        for value in &scaled {
            assert!(value.abs() < 1e-6);
            assert!(value.is_finite());
        }

        let high = scaler.transform(&rows[2]);
        let low = scaler.transform(&rows[0]);
        assert!(high[0] > 0.0 && low[0] < 0.0);
    }
}
