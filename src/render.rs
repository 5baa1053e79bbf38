//! The callback surface a renderer implements.
//!
//! The driver in [`crate::parser`] walks the Markdown document depth-first
//! and calls one method per element, passing the already-rendered text of the
//! element's children. Whatever string a method returns is appended, as is,
//! to the parent's text. Every method has a default that passes the child
//! text through unchanged (or produces nothing when there is no child text),
//! so a renderer only overrides the elements it cares about.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Whether a list is numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Ordered,
    Unordered,
}

/// Column alignment of a table cell, as written in the delimiter row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    None,
    Left,
    Center,
    Right,
}

impl From<pulldown_cmark::Alignment> for Alignment {
    fn from(alignment: pulldown_cmark::Alignment) -> Self {
        match alignment {
            pulldown_cmark::Alignment::None => Alignment::None,
            pulldown_cmark::Alignment::Left => Alignment::Left,
            pulldown_cmark::Alignment::Center => Alignment::Center,
            pulldown_cmark::Alignment::Right => Alignment::Right,
        }
    }
}

/// What an autolink points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutolinkType {
    Url,
    Email,
}

pub trait Render {
    // Block-level

    /// `code` is the raw block content; `language` is the fence tag, if any.
    fn block_code(&self, code: &str, _language: Option<&str>) -> String {
        code.to_string()
    }

    fn block_quote(&self, quote: &str) -> String {
        quote.to_string()
    }

    fn block_html(&self, html: &str) -> String {
        html.to_string()
    }

    /// Container for all footnote definitions, emitted once at document end.
    fn footnotes(&self, content: &str) -> String {
        content.to_string()
    }

    fn footnote_def(&self, content: &str, _number: usize) -> String {
        content.to_string()
    }

    fn header(&self, text: &str, _level: u8) -> String {
        text.to_string()
    }

    fn hrule(&self) -> String {
        String::new()
    }

    fn list(&self, contents: &str, _list_type: ListType) -> String {
        contents.to_string()
    }

    fn list_item(&self, text: &str, _list_type: ListType) -> String {
        text.to_string()
    }

    fn paragraph(&self, text: &str) -> String {
        text.to_string()
    }

    /// `header` and `body` are the concatenated [`Render::table_row`] output
    /// for the header row and the body rows respectively.
    fn table(&self, header: &str, body: &str) -> Result<String> {
        Ok(format!("{header}{body}"))
    }

    fn table_row(&self, content: &str) -> String {
        content.to_string()
    }

    fn table_cell(&self, content: &str, _alignment: Alignment, _header: bool) -> String {
        content.to_string()
    }

    // Span-level

    fn autolink(&self, link: &str, _link_type: AutolinkType) -> String {
        link.to_string()
    }

    fn codespan(&self, code: &str) -> String {
        code.to_string()
    }

    fn double_emphasis(&self, text: &str) -> String {
        text.to_string()
    }

    fn emphasis(&self, text: &str) -> String {
        text.to_string()
    }

    fn triple_emphasis(&self, text: &str) -> String {
        text.to_string()
    }

    fn strikethrough(&self, text: &str) -> String {
        text.to_string()
    }

    fn superscript(&self, text: &str) -> String {
        text.to_string()
    }

    fn underline(&self, text: &str) -> String {
        text.to_string()
    }

    /// `alt_text` is already escaped plain text; `None` when the image has none.
    fn image(&self, _link: &str, _title: Option<&str>, alt_text: Option<&str>) -> String {
        alt_text.unwrap_or_default().to_string()
    }

    fn link(&self, _link: &str, _title: Option<&str>, content: &str) -> String {
        content.to_string()
    }

    fn linebreak(&self) -> String {
        "\n".to_string()
    }

    fn footnote_ref(&self, _number: usize) -> String {
        String::new()
    }

    fn quote(&self, text: &str) -> String {
        format!("\"{text}\"")
    }

    fn raw_html(&self, html: &str) -> String {
        html.to_string()
    }

    fn entity(&self, text: &str) -> String {
        text.to_string()
    }

    fn normal_text(&self, text: &str) -> String {
        text.to_string()
    }
}
