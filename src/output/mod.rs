// src/output/mod.rs
//! Where generated files go and how they get there.
//!
//! The site is planned as a [`SitePlan`] (pure) and written by [`deliver`]
//! (I/O). Export downloads are the one network-backed output.

mod downloads;
mod paths;
mod types;
mod writer;

pub use downloads::HttpExportFetcher;
pub use paths::{
    download_path, lesson_page_href, lesson_page_path, sanitize_filename, slugify, SlugRegistry,
    DOWNLOADS_DIR, LESSON_PAGES_DIR,
};
pub use types::{DeliveryReport, FailedWrite, PlannedFile, SiteFile, SitePlan, WrittenFile};
pub use writer::deliver;
