use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use serde_json::json;
use vuls_logging::vuls_info;

use crate::persist::{ensure_parent_dir, AtomicFileWriter, PersistError};
use crate::VulnerabilityEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportMode {
    #[default]
    Overwrite,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// One `"<url> <title>"` line per entry.
    #[default]
    Text,
    /// Array of `{path, title, url}` objects.
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn format_entries(
    entries: &[VulnerabilityEntry],
    format: ExportFormat,
) -> Result<String, ExportError> {
    match format {
        ExportFormat::Text => Ok(entries
            .iter()
            .map(|entry| format!("{} {}\n", entry.canonical_url(), entry.title()))
            .collect()),
        ExportFormat::Json => {
            let items: Vec<_> = entries
                .iter()
                .map(|entry| {
                    json!({
                        "path": entry.path(),
                        "title": entry.title(),
                        "url": entry.canonical_url(),
                    })
                })
                .collect();
            let mut text = serde_json::to_string_pretty(&items)?;
            text.push('\n');
            Ok(text)
        }
    }
}

/// Writes `entries` to `path`. Overwrite is atomic; append adds to the end of
/// an existing file, creating it when missing.
pub fn export_entries(
    path: &Path,
    entries: &[VulnerabilityEntry],
    mode: ExportMode,
    format: ExportFormat,
) -> Result<usize, ExportError> {
    let content = format_entries(entries, format)?;
    match mode {
        ExportMode::Overwrite => {
            AtomicFileWriter::new(path).write(&content)?;
        }
        ExportMode::Append => {
            ensure_parent_dir(path)?;
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(content.as_bytes())?;
            file.flush()?;
        }
    }
    vuls_info!(
        "Exported {} entries to {} ({mode:?}, {format:?})",
        entries.len(),
        path.display()
    );
    Ok(entries.len())
}
