/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{
    ClassifierError,
    error::Result,
    features::{
        combine,
        lexical::TfidfVectorizer,
        meta::{META_DIM, MetaFeatureExtractor, StandardScaler},
    },
    model::{Label, Model, Prediction, confidence},
    sgd::{SGDTrainer, Sample},
};
use nlp::{
    normalize::TextNormalizer,
    sentiment::{LexiconAnalyzer, SentimentAnalyzer},
};

/// Training hyperparameters. The defaults match the shipped model.
#[derive(Debug, Clone, Copy)]
pub struct TrainParams {
    pub max_epochs: usize,
    pub alpha: f32,
    pub tol: f32,
    pub seed: u64,
}

impl Default for TrainParams {
    fn default() -> Self {
        TrainParams {
            max_epochs: 1000,
            alpha: 1e-4,
            tol: 1e-3,
            seed: 42,
        }
    }
}

/// The full feature-engineering and classification pipeline.
///
/// Holds the stateless collaborators (normalizer, sentiment analyzer) and
/// the training hyperparameters. Training produces a frozen [`Model`];
/// inference borrows a model read-only, so one `Pipeline` may serve any
/// number of concurrent `predict` calls against a shared model.
pub struct Pipeline<S: SentimentAnalyzer = LexiconAnalyzer> {
    normalizer: TextNormalizer,
    analyzer: S,
    params: TrainParams,
}

impl Pipeline<LexiconAnalyzer> {
    pub fn new() -> Self {
        Pipeline::with_analyzer(LexiconAnalyzer::new())
    }
}

impl Default for Pipeline<LexiconAnalyzer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SentimentAnalyzer> Pipeline<S> {
    pub fn with_analyzer(analyzer: S) -> Self {
        Pipeline {
            normalizer: TextNormalizer::new(),
            analyzer,
            params: TrainParams::default(),
        }
    }

    pub fn with_params(mut self, params: TrainParams) -> Self {
        self.params = params;
        self
    }

    /// Fits the whole pipeline on a labeled corpus and returns the frozen
    /// model: TF-IDF vocabulary and IDF weights over the normalized texts,
    /// meta-feature scaler, and the SGD-trained linear classifier over the
    /// combined feature vectors.
    pub fn train(&self, corpus: &[(String, Label)]) -> Result<Model> {
        if corpus.is_empty() {
            return Err(ClassifierError::EmptyCorpus);
        }

        let normalized = corpus
            .iter()
            .map(|(text, _)| self.normalizer.normalize(text))
            .collect::<Vec<_>>();
        let vectorizer = TfidfVectorizer::fit(&normalized)?;

        let texts = corpus
            .iter()
            .map(|(text, _)| text.as_str())
            .collect::<Vec<_>>();
        let extractor = MetaFeatureExtractor::new(&self.analyzer);
        let meta = extractor.extract(&texts)?;
        let scaler = StandardScaler::fit(&meta)?;

        let mut samples = Vec::with_capacity(corpus.len());
        for (i, (_, label)) in corpus.iter().enumerate() {
            let lexical = vectorizer.transform(&normalized[i])?;
            let features = combine(&lexical, &scaler.transform(&meta[i]));
            samples.push(Sample::new(features, *label));
        }

        let mut trainer = SGDTrainer::new(
            vectorizer.len() + META_DIM,
            self.params.max_epochs,
            self.params.alpha,
            self.params.tol,
            self.params.seed,
        );
        trainer.fit(&mut samples);

        Ok(Model {
            vectorizer,
            scaler,
            classifier: trainer.build_classifier(),
        })
    }

    /// Classifies one message against a frozen model. Read-only with
    /// respect to both the pipeline and the model.
    pub fn predict(&self, text: &str, model: &Model) -> Result<Prediction> {
        let normalized = self.normalizer.normalize(text);
        let lexical = model.vectorizer.transform(&normalized)?;

        let extractor = MetaFeatureExtractor::new(&self.analyzer);
        let meta = extractor.extract(&[text])?;
        let features = combine(&lexical, &model.scaler.transform(&meta[0]));

        let (label, margin) = model.classifier.decide(&features)?;
        Ok(Prediction {
            label,
            margin,
            confidence: confidence(margin),
        })
    }
}
