//! Database queries for quoter-server
//!
//! Each submodule owns one table family. All functions take the pool (or a
//! validated table name) and return `quoter_common::Result`.

pub mod attachments;
pub mod quotes;
pub mod quotes_v2;
pub mod stories;

/// Upper bound on bound parameters per `IN (...)` list
pub(crate) const MAX_IN_LIST: usize = 500;

/// Escape `LIKE` wildcards so user text matches literally (ESCAPE '\')
pub(crate) fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}
