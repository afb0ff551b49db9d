/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

pub mod classify;
pub mod dataset;
pub mod train;

use anyhow::Context;
use classifier::Model;
use std::{fs, path::Path};

/// Reads the serialized model written by `train`. A missing or corrupt
/// file is surfaced as explicit unavailability, never masked as a valid
/// prediction.
pub fn load_model(path: &Path) -> anyhow::Result<Model> {
    let bytes = fs::read(path)
        .with_context(|| format!("cannot read model file {}", path.display()))?;
    Model::from_bytes(&bytes).context("model file is corrupt or was never fitted")
}
