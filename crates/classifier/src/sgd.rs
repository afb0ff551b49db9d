/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use crate::{
    MAX_DLOSS,
    features::SparseVector,
    model::{Label, LinearClassifier},
};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

/// One training example: a combined feature vector and its ±1 target.
#[derive(Debug)]
pub struct Sample {
    pub features: SparseVector,
    pub target: f32,
}

impl Sample {
    pub fn new(features: SparseVector, label: Label) -> Self {
        Sample {
            features,
            target: match label {
                Label::Spam => 1.0,
                Label::Ham => -1.0,
            },
        }
    }
}

const EPOCHS_NO_IMPROVEMENT: usize = 5;

/// Stochastic gradient descent over the hinge loss with L2 regularization:
/// a linear max-margin (SVM-style) objective. Training is deterministic
/// for a fixed random state, which seeds the per-epoch example shuffle.
pub struct SGDTrainer {
    weights: Vec<f32>,
    intercept: f32,
    n_epochs: usize,
    alpha: f32,
    tol: f32,
    random_state: u64,
}

impl SGDTrainer {
    pub fn new(n_features: usize, n_epochs: usize, alpha: f32, tol: f32, random_state: u64) -> Self {
        SGDTrainer {
            weights: vec![0.0; n_features],
            intercept: 0.0,
            n_epochs,
            alpha,
            tol,
            random_state,
        }
    }

    pub fn fit(&mut self, samples: &mut [Sample]) {
        let mut rng = StdRng::seed_from_u64(self.random_state);
        let mut t = 1;
        let mut w_scale = 1.0f32;

        // Heuristic to initialize 'optimal' learning rate
        let typw = (1.0 / self.alpha.sqrt()).sqrt();
        let initial_eta0 = typw / 1.0_f32.max(dloss(-typw, 1.0).abs());
        let optimal_init = 1.0 / (initial_eta0 * self.alpha);

        let mut best_loss = f32::INFINITY;
        let mut no_improvement = 0;

        for _ in 0..self.n_epochs {
            samples.shuffle(&mut rng);
            let mut epoch_loss = 0.0;

            for sample in samples.iter() {
                // Prediction
                let mut dot: f32 = 0.0;
                for (idx, weight) in sample.features.entries() {
                    dot += self.weights[*idx as usize] * *weight;
                }
                let p = (dot * w_scale) + self.intercept;
                let eta = 1.0 / (self.alpha * (optimal_init + (t as f32) - 1.0));

                // Compute loss & gradient
                epoch_loss += (1.0 - sample.target * p).max(0.0);
                let g = dloss(p, sample.target).clamp(-MAX_DLOSS, MAX_DLOSS);

                // Lazy weight decay
                w_scale *= 1.0 - (eta * self.alpha);

                // Update weights
                let update = -eta * g;
                if update != 0.0 {
                    let scaled_update = update / w_scale;

                    for (idx, weight) in sample.features.entries() {
                        self.weights[*idx as usize] += scaled_update * *weight;
                    }

                    self.intercept += update;
                }

                // Rescale weights if w_scale is too small or too large
                if !(1e-6..=1e6).contains(&w_scale) {
                    for w in &mut self.weights {
                        *w *= w_scale;
                    }
                    w_scale = 1.0;
                }

                t += 1;
            }

            // Convergence check on the average epoch loss
            let avg_loss = epoch_loss / samples.len().max(1) as f32;
            if avg_loss > best_loss - self.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            if avg_loss < best_loss {
                best_loss = avg_loss;
            }
            if no_improvement >= EPOCHS_NO_IMPROVEMENT {
                break;
            }
        }

        if w_scale != 1.0 {
            for w in &mut self.weights {
                *w *= w_scale;
            }
        }
    }

    pub fn build_classifier(self) -> LinearClassifier {
        LinearClassifier::new(self.weights, self.intercept)
    }
}

// Hinge subgradient with respect to the decision value.
#[inline(always)]
fn dloss(p: f32, y: f32) -> f32 {
    if y * p < 1.0 { -y } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::{SGDTrainer, Sample};
    use crate::{features::SparseVector, model::Label};

    fn sample(dim: u32, entries: &[(u32, f32)], label: Label) -> Sample {
        let mut features = SparseVector::new(dim);
        for (idx, weight) in entries {
            features.push(*idx, *weight);
        }
        Sample::new(features, label)
    }

    fn toy_samples() -> Vec<Sample> {
        // Dimension 0 fires for spam, dimension 1 for ham.
        vec![
            sample(2, &[(0, 1.0)], Label::Spam),
            sample(2, &[(0, 0.8)], Label::Spam),
            sample(2, &[(0, 1.2)], Label::Spam),
            sample(2, &[(1, 1.0)], Label::Ham),
            sample(2, &[(1, 0.9)], Label::Ham),
            sample(2, &[(1, 1.1)], Label::Ham),
        ]
    }

    #[test]
    fn separates_toy_data() {
        let mut trainer = SGDTrainer::new(2, 100, 1e-4, 1e-3, 42);
        let mut samples = toy_samples();
        trainer.fit(&mut samples);
        let classifier = trainer.build_classifier();

        let mut spam = SparseVector::new(2);
        spam.push(0, 1.0);
        let (label, margin) = classifier.decide(&spam).unwrap();
        assert_eq!(label, Label::Spam);
        assert!(margin > 0.0);

        let mut ham = SparseVector::new(2);
        ham.push(1, 1.0);
        let (label, margin) = classifier.decide(&ham).unwrap();
        assert_eq!(label, Label::Ham);
        assert!(margin <= 0.0);
    }

    #[test]
    fn deterministic_for_fixed_seed() {
        let fit = || {
            let mut trainer = SGDTrainer::new(2, 50, 1e-4, 1e-3, 42);
            let mut samples = toy_samples();
            trainer.fit(&mut samples);
            trainer.build_classifier()
        };

        let probe = {
            let mut features = SparseVector::new(2);
            features.push(0, 0.7);
            features.push(1, 0.2);
            features
        };

        let (_, first) = fit().decide(&probe).unwrap();
        let (_, second) = fit().decide(&probe).unwrap();
        assert_eq!(first.to_bits(), second.to_bits());
    }
}
