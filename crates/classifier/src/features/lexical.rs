/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{
    ClassifierError,
    error::Result,
    features::SparseVector,
};
use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// Vocabulary cap: only the top terms by corpus frequency are kept.
pub const MAX_FEATURES: usize = 5000;

const NGRAM_MIN: usize = 1;
const NGRAM_MAX: usize = 3;

/// TF-IDF vectorizer over word 1..3-grams of normalized text.
///
/// The vocabulary and inverse-document-frequency weights are learned once
/// by [`TfidfVectorizer::fit`] and frozen; terms outside the vocabulary
/// contribute nothing at inference, they never grow it.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: AHashMap<String, u32>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Builds the vocabulary and IDF weights from a corpus of normalized
    /// documents. Terms are ranked by total corpus frequency, ties broken
    /// lexicographically; the smoothed IDF is
    /// `ln((1 + n_docs) / (1 + df)) + 1`.
    pub fn fit<S: AsRef<str>>(corpus: &[S]) -> Result<Self> {
        if corpus.is_empty() {
            return Err(ClassifierError::EmptyCorpus);
        }

        let mut term_freq: AHashMap<String, usize> = AHashMap::new();
        let mut doc_freq: AHashMap<String, usize> = AHashMap::new();

        for document in corpus {
            let tokens = document.as_ref().split_whitespace().collect::<Vec<_>>();
            let mut doc_terms: AHashSet<String> = AHashSet::new();

            for n in NGRAM_MIN..=NGRAM_MAX {
                for ngram in tokens.windows(n) {
                    let term = ngram.join(" ");
                    *term_freq.entry(term.clone()).or_insert(0) += 1;
                    doc_terms.insert(term);
                }
            }

            for term in doc_terms {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        if term_freq.is_empty() {
            return Err(ClassifierError::EmptyCorpus);
        }

        let mut ranked = term_freq.into_iter().collect::<Vec<_>>();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(MAX_FEATURES);

        // Index assignment follows term order so that equal corpora always
        // produce identical vocabularies.
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let n_docs = corpus.len() as f32;
        let mut vocabulary = AHashMap::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (idx, (term, _)) in ranked.into_iter().enumerate() {
            let df = doc_freq.get(&term).copied().unwrap_or(0) as f32;
            idf.push(((1.0 + n_docs) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, idx as u32);
        }

        Ok(TfidfVectorizer { vocabulary, idf })
    }

    /// Maps a normalized document onto the frozen vocabulary:
    /// term counts times IDF, L2-normalized. Unknown terms are silently
    /// skipped; an empty document yields an all-zero vector.
    pub fn transform(&self, normalized: &str) -> Result<SparseVector> {
        if self.vocabulary.is_empty() {
            return Err(ClassifierError::NotFitted);
        }

        let tokens = normalized.split_whitespace().collect::<Vec<_>>();
        let mut counts: AHashMap<u32, f32> = AHashMap::new();
        for n in NGRAM_MIN..=NGRAM_MAX {
            for ngram in tokens.windows(n) {
                let term = ngram.join(" ");
                if let Some(idx) = self.vocabulary.get(&term) {
                    *counts.entry(*idx).or_insert(0.0) += 1.0;
                }
            }
        }

        let mut vector = SparseVector::new(self.len() as u32);
        let mut entries = counts.into_iter().collect::<Vec<_>>();
        entries.sort_unstable_by_key(|(idx, _)| *idx);
        for (idx, count) in entries {
            vector.push(idx, count * self.idf[idx as usize]);
        }
        vector.l2_normalize();

        Ok(vector)
    }

    pub fn len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty()
    }
}
