/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::modules::load_model;
use classifier::Pipeline;
use std::path::Path;

pub fn run(model_path: &Path, text: &str) -> anyhow::Result<()> {
    let model = load_model(model_path)?;
    let prediction = Pipeline::new().predict(text, &model)?;

    println!(
        "{} (confidence {:.2}%, margin {:+.4})",
        prediction.label, prediction.confidence, prediction.margin
    );

    Ok(())
}
