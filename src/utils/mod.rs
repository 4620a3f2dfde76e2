// Utility functions

pub mod html;

pub use html::strip_html;

/// Bounded prefix of an upstream response body, safe to return for diagnostics.
///
/// Cuts on a char boundary so multi-byte text never panics.
pub fn snippet(body: &str, max_chars: usize) -> String {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
