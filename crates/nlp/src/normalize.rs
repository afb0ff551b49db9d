/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{language::stopwords::is_stopword, tokenizers::word::WordTokenizer};
use rust_stemmers::{Algorithm, Stemmer};

/// Reduces raw text to a space-joined sequence of lowercased, stemmed,
/// stopword-filtered tokens. The same instance is used for corpus fitting
/// and single-message inference, so both see identical token streams.
pub struct TextNormalizer {
    stemmer: Stemmer,
}

impl TextNormalizer {
    pub fn new() -> Self {
        TextNormalizer {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn normalize(&self, text: &str) -> String {
        let text = text.to_lowercase();
        let mut normalized = String::with_capacity(text.len());

        for token in WordTokenizer::new(&text) {
            if is_stopword(token) {
                continue;
            }
            if !normalized.is_empty() {
                normalized.push(' ');
            }
            normalized.push_str(&self.stemmer.stem(token));
        }

        normalized
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
