//! Line input for the interactive prompt.

use tokio::io::{AsyncBufRead, Lines};

/// Read the next question from `lines`.
///
/// Blank lines are skipped. Returns `None` at end of input or when the user
/// types `exit` or `quit`.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader.
pub async fn next_query<R>(lines: &mut Lines<R>) -> std::io::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if matches!(query, "exit" | "quit") {
            return Ok(None);
        }
        return Ok(Some(query.to_owned()));
    }
    Ok(None)
}
