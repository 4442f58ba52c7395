//! pixfade HTML Parser
//!
//! HTML5 parser built on html5ever. Statically rendered image markup is
//! parsed back into a `pixfade_dom::Document` so it can be hydrated.

mod parser;

pub use parser::HtmlParser;
pub use pixfade_dom::Document;

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Result<Document, HtmlError> {
    HtmlParser::new().parse(html)
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum HtmlError {
    #[error("Failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to build DOM: {0}")]
    Dom(#[from] pixfade_dom::DomError),
}
