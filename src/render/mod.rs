//! HTML rendering of the report data.

pub mod html;

pub use html::render_html_report;
