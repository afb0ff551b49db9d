/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

/// Typed failures of the classification pipeline.
///
/// These are recoverable-by-caller conditions: the pipeline refuses to
/// produce a silently wrong prediction. Degenerate but valid inputs (empty
/// text, zero word count) are floored to safe defaults instead and never
/// surface here.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("model has not been fitted")]
    NotFitted,

    #[error("cannot fit on an empty corpus")]
    EmptyCorpus,

    #[error("feature dimension mismatch: expected {expected}, found {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("upstream feature extraction failed: {0}")]
    UpstreamFeature(String),

    #[error("model serialization failed: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ClassifierError>;
