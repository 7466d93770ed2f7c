//! Dataset writers. The scrape pipeline emits `deputados.csv` and
//! `deputados.json` into a data directory, CSV first.

use crate::types::Deputy;

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_FILE: &str = "deputados.csv";
pub const JSON_FILE: &str = "deputados.json";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Stable output order: by deputy ID, then by legislature for deputies that
/// sat in more than one.
pub fn sort_deputies(deputies: &mut [Deputy]) {
    deputies.sort_by_key(|d| (d.id, d.legislature));
}

pub fn write_csv(deputies: &[Deputy], data_dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(CSV_FILE);

    let mut writer = csv::Writer::from_path(&path)?;
    for deputy in deputies {
        writer.serialize(deputy)?;
    }
    writer.flush()?;

    log::info!("Wrote {} deputies to {}", deputies.len(), path.display());
    Ok(path)
}

pub fn write_json(deputies: &[Deputy], data_dir: &Path) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(data_dir)?;
    let path = data_dir.join(JSON_FILE);

    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, deputies)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    log::info!("Wrote {} deputies to {}", deputies.len(), path.display());
    Ok(path)
}
