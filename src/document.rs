//! The flat machine-readable document.
//!
//! ```text
//! <documents>
//! <document index="1">
//! <source>src/main.rs</source>
//! <document_content>
//! fn main() {}
//! </document_content>
//! </document>
//! </documents>
//! ```
//!
//! Contents are written verbatim, not escaped. A file that cannot be read
//! gets `<document_content read_error="true">` holding the error text, so
//! the placeholder cannot be confused with a file that says the same thing.

use crate::filewalker::FileRecord;
use crate::utils::read_text;
use log::warn;

/// Prefix used in place of content when a file cannot be read.
pub const READ_FAILURE_MARKER: &str = "Failed to read:";

/// Opening content tag for a file that could not be read.
pub const READ_FAILURE_OPEN: &str = "<document_content read_error=\"true\">";

/// Renders the included records, numbered from 1 in the order given.
pub fn render_document(included: &[FileRecord]) -> String {
    let mut out = String::from("<documents>\n");

    for (i, record) in included.iter().enumerate() {
        out.push_str(&format!("<document index=\"{}\">\n", i + 1));
        out.push_str(&format!("<source>{}</source>\n", record.relative_path));
        match read_text(&record.absolute_path) {
            Ok(text) => {
                out.push_str("<document_content>\n");
                out.push_str(&text);
                if !text.is_empty() && !text.ends_with('\n') {
                    out.push('\n');
                }
            }
            Err(err) => {
                warn!("{}: {err:#}", record.relative_path);
                out.push_str(READ_FAILURE_OPEN);
                out.push('\n');
                out.push_str(&format!("{READ_FAILURE_MARKER} {err:#}\n"));
            }
        }

        out.push_str("</document_content>\n");
        out.push_str("</document>\n");
    }

    out.push_str("</documents>\n");
    out
}
