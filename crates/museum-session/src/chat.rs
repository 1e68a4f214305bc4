//! Server → player chat: wrapping long text into 64-byte lines.
//!
//! A chat packet carries at most 64 bytes, so longer notices are split.
//! Every line after the first starts with `"> "` so the player can see it
//! continues the one above. Splits prefer the last space that fits; when
//! there is none the line is cut hard at 64 bytes, one byte earlier if
//! the cut would separate a `&` colour escape from its code.

use museum_protocol::bytes::STRING_LEN;
use museum_protocol::{ProtocolError, SENDER_SERVER, ServerEncoder};
use tokio::io::AsyncWrite;

/// Prefix of every wrapped line after the first.
pub const CONTINUATION: &str = "> ";

const COLOR_ESCAPE: char = '&';

/// A message the server refuses to send.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// A trailing `&` with no colour code after it crashes some clients.
    #[error("message ends with a dangling colour escape")]
    DanglingColorCode,
}

/// Splits `message` into lines of at most 64 bytes.
///
/// Every `char` is one byte on the wire, so lengths here are in chars.
/// An empty message yields no lines.
///
/// # Errors
/// [`ChatError::DanglingColorCode`] if the message ends with `&`.
pub fn wrap_message(message: &str) -> Result<Vec<String>, ChatError> {
    if message.is_empty() {
        return Ok(Vec::new());
    }
    if message.ends_with(COLOR_ESCAPE) {
        return Err(ChatError::DanglingColorCode);
    }

    let mut lines = Vec::new();
    let mut rest: Vec<char> = message.chars().collect();
    // A continued line may not be cut inside its own prefix, or it would
    // never get shorter.
    let mut min_space = 0;

    while rest.len() > STRING_LEN {
        let head = &rest[..STRING_LEN];

        let cut = match head.iter().rposition(|&c| c == ' ') {
            Some(space) if space > min_space => space,
            _ if head[STRING_LEN - 1] == COLOR_ESCAPE => STRING_LEN - 1,
            _ => STRING_LEN,
        };

        lines.push(rest[..cut].iter().collect());
        rest = CONTINUATION.chars().chain(rest[cut..].iter().copied()).collect();
        min_space = CONTINUATION.len();
    }

    let rest: String = rest.into_iter().collect();
    if rest != CONTINUATION {
        lines.push(rest);
    }
    Ok(lines)
}

/// Wraps `text` and sends each line as a server chat message.
///
/// A message [`wrap_message`] refuses is logged and dropped; the session
/// carries on. Write errors are returned.
pub async fn send_message<W>(
    encoder: &mut ServerEncoder<W>,
    text: &str,
) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
{
    let lines = match wrap_message(text) {
        Ok(lines) => lines,
        Err(e) => {
            tracing::error!(text, error = %e, "refusing to send message");
            return Ok(());
        }
    };
    for line in &lines {
        encoder.write_message(line, SENDER_SERVER).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_message_is_one_line() {
        assert_eq!(wrap_message("hello").unwrap(), vec!["hello"]);
        let exact = "a".repeat(STRING_LEN);
        assert_eq!(wrap_message(&exact).unwrap(), vec![exact]);
    }

    #[test]
    fn test_empty_message_has_no_lines() {
        assert!(wrap_message("").unwrap().is_empty());
    }

    #[test]
    fn test_trailing_escape_is_rejected() {
        assert_eq!(wrap_message("oops &"), Err(ChatError::DanglingColorCode));
    }

    #[test]
    fn test_wraps_at_last_space() {
        let message = format!("{} {}", "a".repeat(40), "b".repeat(40));
        let lines = wrap_message(&message).unwrap();
        assert_eq!(lines[0], "a".repeat(40));
        assert_eq!(lines[1], format!(">  {}", "b".repeat(40)));
    }

    #[test]
    fn test_hard_cut_without_spaces() {
        let message = "x".repeat(200);
        let lines = wrap_message(&message).unwrap();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].len(), 64);
        for line in &lines[1..] {
            assert!(line.starts_with(CONTINUATION));
        }
        // 64 + 62 + 62 original bytes, 12 left over.
        assert_eq!(lines[3], format!("> {}", "x".repeat(12)));
    }

    #[test]
    fn test_long_message_lines_fit() {
        let message = "word ".repeat(40) + "end";
        let lines = wrap_message(&message).unwrap();
        assert!(lines.len() >= 4);
        for line in &lines {
            assert!(line.len() <= STRING_LEN, "{line:?} is too long");
        }
        for line in &lines[1..] {
            assert!(line.starts_with(CONTINUATION));
        }
    }

    #[test]
    fn test_does_not_split_colour_escape() {
        let message = format!("{}&c{}", "x".repeat(63), "y".repeat(10));
        let lines = wrap_message(&message).unwrap();
        assert_eq!(lines[0], "x".repeat(63));
        assert_eq!(lines[1], format!("> &c{}", "y".repeat(10)));
    }

    #[test]
    fn test_lengths_count_chars() {
        let message = "é".repeat(100);
        let lines = wrap_message(&message).unwrap();
        assert_eq!(lines[0], "é".repeat(64));
        assert_eq!(lines[1], format!("> {}", "é".repeat(36)));
    }

    #[test]
    fn test_spaces_inside_prefix_still_progress() {
        // Every continuation would otherwise cut right after "> ".
        let message = format!("a {}", "b".repeat(150));
        let lines = wrap_message(&message).unwrap();
        for line in &lines {
            assert!(line.len() <= STRING_LEN);
        }
        assert_eq!(lines[0], "a");
        let rejoined: String = lines[1..]
            .iter()
            .map(|l| l.trim_start_matches(CONTINUATION).trim_start())
            .collect();
        assert_eq!(rejoined, "b".repeat(150));
    }

    #[tokio::test]
    async fn test_send_message_skips_rejected_text() {
        let mut enc = ServerEncoder::new(Vec::new());
        send_message(&mut enc, "bad &").await.unwrap();
        assert!(enc.into_inner().is_empty());
    }

    #[tokio::test]
    async fn test_send_message_writes_each_line() {
        let mut enc = ServerEncoder::new(Vec::new());
        send_message(&mut enc, &"x".repeat(100)).await.unwrap();
        let out = enc.into_inner();
        assert_eq!(out.len(), 2 * 66);
        assert_eq!(out[0], 0x0d);
        assert_eq!(out[1], 0xff);
    }
}
