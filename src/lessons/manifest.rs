//! Batch manifest: a CSV file naming one lesson per row.
//!
//! The header row is required. Columns are matched case-insensitively and
//! may come in any order; unknown columns are ignored. Recognised columns:
//! `title`, `format`, `theme`, `exportAs` and `source`.

use super::{LessonEntry, LessonOverrides};
use crate::constants::DEFAULT_MANIFEST_SOURCE;
use crate::error::AppError;
use crate::model::{DeckFormat, ExportFormat};
use crate::types::ThemeName;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::path::Path;

/// Column positions found in the header row.
#[derive(Debug, Default)]
struct Columns {
    title: Option<usize>,
    format: Option<usize>,
    theme: Option<usize>,
    export_as: Option<usize>,
    source: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Self {
        let mut columns = Columns::default();
        for (index, name) in header.iter().enumerate() {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "title" => &mut columns.title,
                "format" => &mut columns.format,
                "theme" => &mut columns.theme,
                "exportas" => &mut columns.export_as,
                "source" => &mut columns.source,
                other => {
                    log::debug!("Ignoring manifest column '{}'", other);
                    continue;
                }
            };
            slot.get_or_insert(index);
        }
        columns
    }
}

/// Reads the manifest at `path`; lesson sources resolve against `input_dir`.
pub fn read_manifest(path: &Path, input_dir: &Path) -> Result<Vec<LessonEntry>, AppError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let columns = Columns::from_header(reader.headers()?);
    if columns.title.is_none() && columns.source.is_none() {
        log::warn!(
            "Manifest {} has neither a title nor a source column",
            path.display()
        );
    }

    let mut entries = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        // Header is row 1
        entries.push(entry_from_row(&record, &columns, input_dir, line + 2));
    }

    log::info!("Manifest {} lists {} lessons", path.display(), entries.len());
    Ok(entries)
}

fn entry_from_row(
    record: &StringRecord,
    columns: &Columns,
    input_dir: &Path,
    row: usize,
) -> LessonEntry {
    let cell = |column: Option<usize>| {
        column
            .and_then(|index| record.get(index))
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    let source = cell(columns.source).unwrap_or(DEFAULT_MANIFEST_SOURCE);

    LessonEntry {
        source: input_dir.join(source),
        title: cell(columns.title).map(str::to_string),
        overrides: LessonOverrides {
            format: cell(columns.format).and_then(|v| parse_cell::<DeckFormat>(v, "format", row)),
            theme: cell(columns.theme).and_then(|v| match ThemeName::new(v) {
                Ok(theme) => Some(theme),
                Err(e) => {
                    log::warn!("Manifest row {}: {}; using the run default", row, e);
                    None
                }
            }),
            export_as: cell(columns.export_as)
                .and_then(|v| parse_cell::<ExportFormat>(v, "exportAs", row)),
        },
    }
}

/// Parses one cell, falling back to the run default when it is unusable.
fn parse_cell<T>(value: &str, column: &str, row: usize) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!(
                "Manifest row {}: invalid {} '{}' ({}); using the run default",
                row,
                column,
                value,
                e
            );
            None
        }
    }
}
