// src/output/writer.rs
//! Writes a planned site to disk.
//!
//! Site files are only ever written here. A file that cannot be written is
//! recorded in the report and the rest of the site is still written.

use super::types::{DeliveryReport, FailedWrite, PlannedFile, SitePlan, WrittenFile};
use std::fs;
use std::io;

/// Writes every planned file, creating parent directories as needed.
pub fn deliver(plan: SitePlan) -> DeliveryReport {
    log::info!("Writing {} site files", plan.len());

    let report = plan
        .into_files()
        .into_iter()
        .fold(DeliveryReport::default(), |mut report, file| {
            match write_site_file(&file) {
                Ok(()) => report.written.push(WrittenFile {
                    bytes: file.content.len(),
                    kind: file.kind,
                    path: file.path,
                }),
                Err(err) => {
                    log::error!("Could not write {} to {}: {}", file.kind, file.path.display(), err);
                    report.failed.push(FailedWrite {
                        kind: file.kind,
                        path: file.path,
                        error: err.to_string(),
                    });
                }
            }
            report
        });

    log::info!(
        "Site written: {} files ({} bytes), {} failed",
        report.written.len(),
        report.bytes_written(),
        report.failed.len()
    );
    report
}

fn write_site_file(file: &PlannedFile) -> io::Result<()> {
    if let Some(parent) = file.path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&file.path, &file.content)?;
    log::debug!("Wrote {} ({} bytes)", file.path.display(), file.content.len());
    Ok(())
}
