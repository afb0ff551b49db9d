/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::modules::dataset;
use classifier::{Label, Pipeline, TrainParams};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use std::{fs, path::Path};

pub async fn run(
    data_dir: &Path,
    model_path: &Path,
    feedback: Option<&Path>,
    test_size: f32,
    seed: u64,
) -> anyhow::Result<()> {
    let dataset_path = dataset::fetch(data_dir).await?;
    let mut corpus = dataset::load_corpus(&dataset_path)?;

    if let Some(feedback) = feedback.filter(|path| path.exists()) {
        let reported = dataset::load_feedback(feedback)?;
        tracing::info!(samples = reported.len(), "merging feedback samples");
        corpus.extend(reported);
    }

    let loaded = corpus.len();
    dataset::dedup(&mut corpus);
    tracing::info!(
        loaded,
        unique = corpus.len(),
        "corpus loaded and deduplicated"
    );

    let (train, test) = train_test_split(corpus, test_size, seed);
    anyhow::ensure!(!train.is_empty(), "training corpus is empty");

    tracing::info!(
        train = train.len(),
        test = test.len(),
        "training SGD classifier over TF-IDF + meta features"
    );
    let pipeline = Pipeline::new().with_params(TrainParams {
        seed,
        ..TrainParams::default()
    });
    let model = pipeline.train(&train)?;

    if !test.is_empty() {
        let mut y_true = Vec::with_capacity(test.len());
        let mut y_pred = Vec::with_capacity(test.len());
        for (text, label) in &test {
            y_true.push(*label);
            y_pred.push(pipeline.predict(text, &model)?.label);
        }

        println!("Accuracy:  {:.4}", accuracy_score(&y_true, &y_pred));
        println!(
            "Precision: {:.4}",
            precision_score(&y_true, &y_pred, Label::Spam)
        );
        println!(
            "Recall:    {:.4}",
            recall_score(&y_true, &y_pred, Label::Spam)
        );
        println!("F1 score:  {:.4}", f1_score(&y_true, &y_pred, Label::Spam));
    }

    fs::write(model_path, model.to_bytes()?)?;
    tracing::info!(path = %model_path.display(), "model saved");

    Ok(())
}

/// Class-stratified split: the test share is drawn from spam and ham
/// independently so both partitions keep the corpus class balance.
pub fn train_test_split(
    corpus: Vec<(String, Label)>,
    test_size: f32,
    seed: u64,
) -> (Vec<(String, Label)>, Vec<(String, Label)>) {
    let mut spam = Vec::new();
    let mut ham = Vec::new();
    for entry in corpus {
        if entry.1 == Label::Spam {
            spam.push(entry);
        } else {
            ham.push(entry);
        }
    }

    let mut rng = StdRng::seed_from_u64(seed);
    spam.shuffle(&mut rng);
    ham.shuffle(&mut rng);

    let spam_test = (spam.len() as f32 * test_size).round() as usize;
    let ham_test = (ham.len() as f32 * test_size).round() as usize;

    let mut train = Vec::new();
    let mut test = Vec::new();
    test.extend(spam.drain(..spam_test));
    test.extend(ham.drain(..ham_test));
    train.extend(spam);
    train.extend(ham);

    (train, test)
}

pub fn accuracy_score(y_true: &[Label], y_pred: &[Label]) -> f32 {
    y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(true_val, pred_val)| true_val == pred_val)
        .count() as f32
        / y_true.len().max(1) as f32
}

pub fn precision_score(y_true: &[Label], y_pred: &[Label], positive_class: Label) -> f32 {
    let true_positives = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(true_val, pred_val)| {
            **pred_val == positive_class && **true_val == positive_class
        })
        .count() as f32;

    let predicted_positives = y_pred
        .iter()
        .filter(|pred_val| **pred_val == positive_class)
        .count() as f32;

    if predicted_positives == 0.0 {
        0.0
    } else {
        true_positives / predicted_positives
    }
}

pub fn recall_score(y_true: &[Label], y_pred: &[Label], positive_class: Label) -> f32 {
    let true_positives = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(true_val, pred_val)| {
            **pred_val == positive_class && **true_val == positive_class
        })
        .count() as f32;

    let actual_positives = y_true
        .iter()
        .filter(|true_val| **true_val == positive_class)
        .count() as f32;

    if actual_positives == 0.0 {
        0.0
    } else {
        true_positives / actual_positives
    }
}

pub fn f1_score(y_true: &[Label], y_pred: &[Label], positive_class: Label) -> f32 {
    let precision = precision_score(y_true, y_pred, positive_class);
    let recall = recall_score(y_true, y_pred, positive_class);

    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * (precision * recall) / (precision + recall)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        accuracy_score, f1_score, precision_score, recall_score, train_test_split,
    };
    use classifier::Label;

    #[test]
    fn metric_scores() {
        use Label::{Ham, Spam};
        let y_true = [Spam, Spam, Ham, Ham];
        let y_pred = [Spam, Ham, Ham, Spam];

        assert_eq!(accuracy_score(&y_true, &y_pred), 0.5);
        assert_eq!(precision_score(&y_true, &y_pred, Spam), 0.5);
        assert_eq!(recall_score(&y_true, &y_pred, Spam), 0.5);
        assert_eq!(f1_score(&y_true, &y_pred, Spam), 0.5);

        // No predicted positives: precision degrades to zero, not NaN.
        let all_ham = [Ham, Ham, Ham, Ham];
        assert_eq!(precision_score(&y_true, &all_ham, Spam), 0.0);
        assert_eq!(f1_score(&y_true, &all_ham, Spam), 0.0);
    }

    #[test]
    fn stratified_split() {
        let corpus = (0..100)
            .map(|i| {
                let label = if i % 4 == 0 { Label::Spam } else { Label::Ham };
                (format!("message number {i}"), label)
            })
            .collect::<Vec<_>>();

        let (train, test) = train_test_split(corpus.clone(), 0.2, 42);
        assert_eq!(train.len() + test.len(), 100);
        assert_eq!(test.len(), 20);
        assert_eq!(
            test.iter().filter(|(_, l)| *l == Label::Spam).count(),
            5
        );

        // Same seed, same partition.
        let (train_again, test_again) = train_test_split(corpus, 0.2, 42);
        assert_eq!(train, train_again);
        assert_eq!(test, test_again);
    }
}
