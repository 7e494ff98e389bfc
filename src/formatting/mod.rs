// src/formatting/mod.rs
//! Renders batch outcomes and lesson Markdown into the static site.

mod markdown;
mod site;

pub use markdown::render_markdown;
pub use site::{RenderedPage, RenderedSite, SiteRenderer, StatusSnapshot, SITE_TITLE, STATUS_FILE};
