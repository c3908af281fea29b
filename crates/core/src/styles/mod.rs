// ABOUTME: CSS style extraction and inlining for editor-exported HTML.
// ABOUTME: extract builds selector->declaration maps; inline applies them as style attributes.

pub mod extract;
pub mod inline;

pub use extract::{extract, StyleIndex, StyleMap};
pub use inline::{inline_all_styles, remove_style_tags, InlineOptions};
