//! Pulls deck and export links out of terminal job payloads.
//!
//! The service has returned links in several shapes: flat fields
//! (`gammaUrl`, `pdfUrl`), nested objects (`result.urls.share`) and a
//! `files` array of `{type, url}` entries. Each link is looked up through
//! an ordered list of JSON pointers and the first non-empty string wins.
//! Nothing here fails; a missing link is simply `None`.

use crate::model::{ExportFormat, ExtractedResult};
use serde_json::Value;

const SHARE_URL_POINTERS: &[&str] = &[
    "/gammaUrl",
    "/shareUrl",
    "/url",
    "/publicUrl",
    "/urls/share",
    "/result/urls/share",
    "/result/gammaUrl",
    "/result/url",
    "/data/gammaUrl",
    "/data/shareUrl",
    "/data/url",
    "/data/publicUrl",
    "/data/urls/share",
    "/data/result/urls/share",
    "/data/result/gammaUrl",
    "/data/result/url",
];

const FILES_POINTERS: &[&str] = &["/files", "/data/files", "/result/files", "/data/result/files"];

/// Containers searched for a `{format}Url` field matching the export hint.
const HINTED_FILE_PREFIXES: &[&str] = &["", "/data", "/result", "/data/result"];

const FILE_URL_POINTERS: &[&str] = &[
    "/exportUrl",
    "/pdfUrl",
    "/pptxUrl",
    "/urls/export",
    "/result/exportUrl",
    "/result/pdfUrl",
    "/result/pptxUrl",
    "/result/urls/export",
    "/data/exportUrl",
    "/data/pdfUrl",
    "/data/pptxUrl",
    "/data/urls/export",
    "/data/result/exportUrl",
    "/data/result/pdfUrl",
    "/data/result/pptxUrl",
    "/data/result/urls/export",
];

/// Extracts the share link and export file link from a terminal payload.
pub fn extract(payload: &Value, export_hint: Option<ExportFormat>) -> ExtractedResult {
    ExtractedResult {
        share_url: first_string(payload, SHARE_URL_POINTERS.iter().copied()),
        file_url: file_url(payload, export_hint),
    }
}

fn file_url(payload: &Value, export_hint: Option<ExportFormat>) -> Option<String> {
    let listed = FILES_POINTERS
        .iter()
        .find_map(|pointer| payload.pointer(pointer).and_then(Value::as_array))
        .filter(|files| !files.is_empty())
        .and_then(|files| {
            let matching = export_hint.and_then(|hint| {
                files.iter().find(|file| {
                    file.get("type")
                        .and_then(Value::as_str)
                        .is_some_and(|kind| kind.trim().eq_ignore_ascii_case(hint.as_str()))
                })
            });
            matching
                .or_else(|| files.first())
                .and_then(|file| non_empty(file.get("url")))
        });
    if listed.is_some() {
        return listed;
    }

    if let Some(hint) = export_hint {
        let hinted: Vec<String> = HINTED_FILE_PREFIXES
            .iter()
            .map(|prefix| format!("{}/{}Url", prefix, hint.as_str()))
            .collect();
        if let Some(url) = first_string(payload, hinted.iter().map(String::as_str)) {
            return Some(url);
        }
    }

    first_string(payload, FILE_URL_POINTERS.iter().copied())
}

fn first_string<'a>(payload: &Value, pointers: impl IntoIterator<Item = &'a str>) -> Option<String> {
    pointers
        .into_iter()
        .find_map(|pointer| non_empty(payload.pointer(pointer)))
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
