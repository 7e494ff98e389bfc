//! Lesson Markdown to HTML for the viewer pages.

use comrak::markdown_to_html;
use comrak::options::Options;

fn lesson_options() -> Options<'static> {
    let mut options = Options::default();
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.autolink = true;
    ext.tasklist = true;

    // Lesson text is untrusted; raw HTML is replaced with a placeholder comment
    options.render.r#unsafe = false;
    options
}

/// Renders lesson Markdown to an HTML fragment.
pub fn render_markdown(markdown: &str) -> String {
    markdown_to_html(markdown, &lesson_options())
}
