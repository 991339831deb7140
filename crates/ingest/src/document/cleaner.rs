//! Raw text normalization applied before chunking.

/// Normalize extracted text: collapse whitespace runs (a run containing a
/// newline becomes a single `\n`, any other run a single space), drop
/// characters outside printable ASCII plus newline, and trim the ends.
///
/// Pure and idempotent: `clean(clean(x)) == clean(x)`.
pub fn clean(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Separator owed to the output once the next printable char arrives.
    let mut pending: Option<char> = None;

    for ch in text.chars() {
        if ch.is_whitespace() {
            let sep = if ch == '\n' || ch == '\r' { '\n' } else { ' ' };
            pending = match pending {
                Some('\n') => Some('\n'),
                _ if sep == '\n' => Some('\n'),
                _ => Some(' '),
            };
        } else if (' '..='~').contains(&ch) {
            if let Some(sep) = pending.take() {
                if !out.is_empty() {
                    out.push(sep);
                }
            }
            out.push(ch);
        }
        // Non-printable and non-ASCII characters are dropped without
        // breaking a surrounding whitespace run.
    }

    out
}
