//! Report files: naming, directory handling, JSON/CSV export.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::PrimitiveDateTime;

/// Keep letters, digits, space, `_` and `-`; everything else becomes `_`.
pub fn safe_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, ' ' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// `{dir}/{safe_name}_{YYYYMMDD_HHMMSS}.{ext}`
pub fn report_path(dir: &Path, name: &str, ext: &str, now: PrimitiveDateTime) -> Result<PathBuf> {
    let stamp = now
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .context("format report timestamp")?;
    Ok(dir.join(format!("{}_{stamp}.{ext}", safe_name(name))))
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_text(path: &Path, lines: &[String]) -> Result<()> {
    ensure_parent(path)?;
    let mut body = lines.join("\n");
    body.push('\n');
    std::fs::write(path, body).with_context(|| format!("write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "text written");
    Ok(())
}

pub fn export_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    ensure_parent(path)?;
    let data = serde_json::to_vec_pretty(value)?;
    std::fs::write(path, data).with_context(|| format!("write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "json exported");
    Ok(())
}

/// One CSV record per row; the header comes from the row's field names.
pub fn export_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    ensure_parent(path)?;
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "csv exported");
    Ok(())
}
