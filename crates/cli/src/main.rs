/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

mod modules;

use clap::{Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "inbox-shield", about = "Spam classification for short messages", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download and extract the training dataset
    Fetch {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
    /// Train a model on the dataset and persist it
    Train {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
        #[arg(long, default_value = "model.bin")]
        model: PathBuf,
        /// Feedback TSV collected by the /report endpoint, merged into the
        /// training corpus when present
        #[arg(long)]
        feedback: Option<PathBuf>,
        #[arg(long, default_value_t = 0.2)]
        test_size: f32,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Classify a single message with a trained model
    Classify {
        #[arg(long, default_value = "model.bin")]
        model: PathBuf,
        text: String,
    },
    /// Serve the prediction API over HTTP
    Serve {
        #[arg(long, default_value = "model.bin")]
        model: PathBuf,
        #[arg(long, default_value = "127.0.0.1:8000")]
        listen: SocketAddr,
        #[arg(long, default_value = "feedback_data.tsv")]
        feedback: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match Cli::parse().command {
        Commands::Fetch { data_dir } => {
            let path = modules::dataset::fetch(&data_dir).await?;
            tracing::info!(path = %path.display(), "dataset ready");
        }
        Commands::Train {
            data_dir,
            model,
            feedback,
            test_size,
            seed,
        } => {
            modules::train::run(&data_dir, &model, feedback.as_deref(), test_size, seed).await?;
        }
        Commands::Classify { model, text } => {
            modules::classify::run(&model, &text)?;
        }
        Commands::Serve {
            model,
            listen,
            feedback,
        } => {
            let model = Arc::new(modules::load_model(&model)?);
            tracing::info!(features = model.num_features(), "model loaded");
            http::Server::new(model, &feedback)?.serve(listen).await?;
        }
    }

    Ok(())
}
