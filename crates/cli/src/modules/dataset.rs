/*
 * SPDX-FileCopyrightText: 2020 Stalwart Labs LLC <hello@stalw.art>
 *
 * SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-SEL
 */

use ahash::AHashSet;
use anyhow::Context;
use classifier::Label;
use std::{
    fs::{self, File},
    io::{self, Cursor},
    path::{Path, PathBuf},
};
use zip::ZipArchive;

const DATA_URL: &str = "https://archive.ics.uci.edu/static/public/228/sms+spam+collection.zip";
const DATA_FILE: &str = "SMSSpamCollection";

/// Downloads and extracts the UCI SMS Spam Collection unless it is already
/// present on disk.
pub async fn fetch(data_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = data_dir.join(DATA_FILE);
    if path.exists() {
        tracing::info!(path = %path.display(), "dataset already exists");
        return Ok(path);
    }

    fs::create_dir_all(data_dir)?;
    tracing::info!(url = DATA_URL, "downloading dataset");
    let bytes = reqwest::get(DATA_URL)
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let mut archive = ZipArchive::new(Cursor::new(bytes.as_ref()))?;
    let mut entry = archive
        .by_name(DATA_FILE)
        .context("archive does not contain the dataset file")?;
    let mut output = File::create(&path)?;
    io::copy(&mut entry, &mut output)?;

    tracing::info!(path = %path.display(), "dataset downloaded and extracted");
    Ok(path)
}

/// Loads the raw `label<TAB>text` dataset. The UCI file is not
/// quote-escaped, so quoting is disabled.
pub fn load_corpus(path: &Path) -> anyhow::Result<Vec<(String, Label)>> {
    read_tsv(path, false)
}

/// Loads the feedback file written by the `/report` endpoint, which is
/// produced by a quote-aware TSV writer.
pub fn load_feedback(path: &Path) -> anyhow::Result<Vec<(String, Label)>> {
    read_tsv(path, true)
}

fn read_tsv(path: &Path, quoting: bool) -> anyhow::Result<Vec<(String, Label)>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(quoting)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))?;

    let mut corpus = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(label) = record.get(0) else {
            continue;
        };
        let Ok(label) = label.parse::<Label>() else {
            tracing::warn!(label, "skipping record with unknown label");
            continue;
        };
        // Stray tabs inside the message body come back as extra fields.
        let text = record.iter().skip(1).collect::<Vec<_>>().join("\t");
        if !text.is_empty() {
            corpus.push((text, label));
        }
    }

    Ok(corpus)
}

/// Drops exact duplicates across data sources, keeping first occurrences.
pub fn dedup(corpus: &mut Vec<(String, Label)>) {
    let mut seen = AHashSet::with_capacity(corpus.len());
    corpus.retain(|entry| seen.insert(entry.clone()));
}

#[cfg(test)]
mod tests {
    use super::{dedup, load_corpus};
    use classifier::Label;
    use std::io::Write;

    #[test]
    fn loads_tab_separated_corpus() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "ham\tSee you at lunch").unwrap();
        writeln!(file, "spam\tWIN a \"free\" prize now!!!").unwrap();
        writeln!(file, "junk\tbad label, skipped").unwrap();
        writeln!(file, "spam\ttext\twith\ttabs").unwrap();
        file.flush().unwrap();

        let corpus = load_corpus(file.path()).unwrap();
        assert_eq!(
            corpus,
            vec![
                ("See you at lunch".to_string(), Label::Ham),
                ("WIN a \"free\" prize now!!!".to_string(), Label::Spam),
                ("text\twith\ttabs".to_string(), Label::Spam),
            ]
        );
    }

    #[test]
    fn dedup_drops_exact_duplicates() {
        let mut corpus = vec![
            ("free prize".to_string(), Label::Spam),
            ("see you soon".to_string(), Label::Ham),
            ("free prize".to_string(), Label::Spam),
            // Same text, different label: both kept.
            ("free prize".to_string(), Label::Ham),
        ];
        dedup(&mut corpus);
        assert_eq!(corpus.len(), 3);
    }
}
