//! Text extraction over a session's uploaded PDFs.

use std::path::Path;

use tracing::warn;

/// Upper bound on the concatenated context handed to the model.
pub const MAX_CONTEXT_CHARS: usize = 50_000;

/// Concatenated text of every PDF in the session's upload folder,
/// newline-separated and truncated to [`MAX_CONTEXT_CHARS`].
///
/// A file that fails to parse is skipped; its failure is logged. Returns an
/// empty string when the folder is missing or holds no PDFs.
pub fn session_text(upload_root: &Path, session_id: &str) -> String {
    let session_dir = upload_root.join(session_id);
    if !session_dir.is_dir() {
        return String::new();
    }

    let entries = match std::fs::read_dir(&session_dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(session = session_id, error = %err, "could not read session folder");
            return String::new();
        }
    };

    let mut full_text = String::new();
    for entry in entries.flatten() {
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            continue;
        }

        match pdf_extract::extract_text(&path) {
            Ok(text) => {
                if !full_text.is_empty() {
                    full_text.push('\n');
                }
                full_text.push_str(&text);
            }
            Err(err) => {
                warn!(file = %path.display(), error = %err, "failed to extract text");
            }
        }
    }

    truncate_chars(full_text, MAX_CONTEXT_CHARS)
}

/// Truncate to at most `max` characters without splitting a code point.
fn truncate_chars(mut s: String, max: usize) -> String {
    if let Some((idx, _)) = s.char_indices().nth(max) {
        s.truncate(idx);
    }
    s
}
