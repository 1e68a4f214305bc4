//! Primitive fixed-width field codecs.
//!
//! Every field in the classic protocol is fixed width: integers are
//! big-endian, strings are always 64 bytes padded with spaces. There is
//! no length prefix anywhere, so these helpers refuse to truncate: an
//! oversized string would silently shift every field after it.
//!
//! String bytes are code page 437 on the client side. The server never
//! interprets them, so each byte maps to the `char` with the same value
//! and back. Whatever a client sends is echoed byte for byte.

use std::io::{Read, Write};

use crate::ProtocolError;

/// Width of every string field on the wire.
pub const STRING_LEN: usize = 64;

/// Reads a big-endian `i16` with a single read call.
///
/// A read that returns fewer than 2 bytes is an error; partial reads are
/// not retried.
pub fn read_i16<R: Read>(reader: &mut R) -> Result<i16, ProtocolError> {
    let mut buf = [0u8; 2];
    let n = reader.read(&mut buf)?;
    if n != buf.len() {
        return Err(ProtocolError::ShortRead {
            expected: buf.len(),
            actual: n,
        });
    }
    Ok(i16::from_be_bytes(buf))
}

/// Packs `value` big-endian into a 2-byte region.
///
/// # Panics
/// If `dest` is not exactly 2 bytes long. Packet layouts are fixed at
/// compile time, so a mismatch is a bug in the caller.
pub fn write_i16(dest: &mut [u8], value: i16) {
    assert_eq!(dest.len(), 2, "write_i16: destination size != 2");
    dest.copy_from_slice(&value.to_be_bytes());
}

/// Writes a big-endian `i32` with a single write call.
pub fn write_i32<W: Write>(
    writer: &mut W,
    value: i32,
) -> Result<(), ProtocolError> {
    let bytes = value.to_be_bytes();
    let n = writer.write(&bytes)?;
    if n != bytes.len() {
        return Err(ProtocolError::ShortWrite {
            expected: bytes.len(),
            actual: n,
        });
    }
    Ok(())
}

/// Substituted for characters with no single-byte encoding.
pub const UNENCODABLE: u8 = b'?';

/// Copies `text` into a 64-byte field and pads the rest with spaces.
///
/// Each `char` becomes one byte. Characters above U+00FF have no byte of
/// their own and are written as `?`.
pub fn write_string(dest: &mut [u8], text: &str) -> Result<(), ProtocolError> {
    if dest.len() != STRING_LEN {
        return Err(ProtocolError::BadDestinationSize(dest.len()));
    }

    let len = text.chars().count();
    if len > STRING_LEN {
        return Err(ProtocolError::StringTooLong(len));
    }

    for (slot, c) in dest.iter_mut().zip(text.chars()) {
        *slot = u8::try_from(c).unwrap_or(UNENCODABLE);
    }
    dest[len..].fill(b' ');
    Ok(())
}

/// Decodes a 64-byte string field, dropping the trailing space padding.
///
/// Never fails: every byte decodes to exactly one `char`.
pub fn read_string(field: &[u8]) -> String {
    let end = field
        .iter()
        .rposition(|&b| b != b' ')
        .map_or(0, |i| i + 1);
    field[..end].iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_i16_big_endian() {
        let mut input: &[u8] = &[0x01, 0x02];
        assert_eq!(read_i16(&mut input).unwrap(), 0x0102);

        let mut input: &[u8] = &[0xff, 0xfe];
        assert_eq!(read_i16(&mut input).unwrap(), -2);
    }

    #[test]
    fn test_read_i16_short_read() {
        let mut input: &[u8] = &[0x01];
        let err = read_i16(&mut input).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ShortRead { expected: 2, actual: 1 }
        ));
    }

    #[test]
    fn test_read_i16_does_not_retry_partial_reads() {
        // A reader that only ever hands out one byte per call.
        struct Trickle<'a>(&'a [u8]);
        impl Read for Trickle<'_> {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                if self.0.is_empty() || buf.is_empty() {
                    return Ok(0);
                }
                buf[0] = self.0[0];
                self.0 = &self.0[1..];
                Ok(1)
            }
        }

        let mut input = Trickle(&[0x00, 0x10]);
        assert!(matches!(
            read_i16(&mut input),
            Err(ProtocolError::ShortRead { .. })
        ));
    }

    #[test]
    fn test_write_i16() {
        let mut buf = [0u8; 2];
        write_i16(&mut buf, 256);
        assert_eq!(buf, [0x01, 0x00]);
        write_i16(&mut buf, -1);
        assert_eq!(buf, [0xff, 0xff]);
    }

    #[test]
    #[should_panic(expected = "destination size != 2")]
    fn test_write_i16_wrong_size_panics() {
        let mut buf = [0u8; 3];
        write_i16(&mut buf, 1);
    }

    #[test]
    fn test_write_i32() {
        let mut out = Vec::new();
        write_i32(&mut out, 0x0102_0304).unwrap();
        assert_eq!(out, [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_write_i32_short_write() {
        let mut backing = [0u8; 3];
        let mut out: &mut [u8] = &mut backing;
        let err = write_i32(&mut out, 7).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::ShortWrite { expected: 4, actual: 3 }
        ));
    }

    #[test]
    fn test_write_string_pads_with_spaces() {
        let mut buf = [0u8; STRING_LEN];
        write_string(&mut buf, "hello").unwrap();
        assert_eq!(&buf[..5], b"hello");
        assert!(buf[5..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_write_string_exactly_64_bytes() {
        let text = "x".repeat(STRING_LEN);
        let mut buf = [0u8; STRING_LEN];
        write_string(&mut buf, &text).unwrap();
        assert_eq!(&buf[..], text.as_bytes());
    }

    #[test]
    fn test_write_string_too_long() {
        let mut buf = [0u8; STRING_LEN];
        let err = write_string(&mut buf, &"x".repeat(65)).unwrap_err();
        assert!(matches!(err, ProtocolError::StringTooLong(65)));
    }

    #[test]
    fn test_write_string_bad_destination() {
        let mut buf = [0u8; 10];
        let err = write_string(&mut buf, "hi").unwrap_err();
        assert!(matches!(err, ProtocolError::BadDestinationSize(10)));
    }

    #[test]
    fn test_string_round_trip_strips_trailing_spaces() {
        let long = "z".repeat(STRING_LEN);
        for text in ["", "Alice", "two words", "trailing   ", long.as_str()] {
            let mut buf = [0u8; STRING_LEN];
            write_string(&mut buf, text).unwrap();
            assert_eq!(read_string(&buf), text.trim_end_matches(' '));
        }
    }

    #[test]
    fn test_high_bytes_round_trip_exactly() {
        let mut field = [b' '; STRING_LEN];
        field[0] = b'A';
        field[1] = 0x82;
        field[2] = b'B';
        field[3] = 0xFF;

        let text = read_string(&field);
        assert_eq!(text.chars().count(), 4);

        let mut out = [0u8; STRING_LEN];
        write_string(&mut out, &text).unwrap();
        assert_eq!(out, field);
    }

    #[test]
    fn test_full_field_of_high_bytes_fits() {
        let field = [0xB0; STRING_LEN];
        let text = read_string(&field);
        let mut out = [0u8; STRING_LEN];
        write_string(&mut out, &text).unwrap();
        assert_eq!(out, field);
    }

    #[test]
    fn test_wide_chars_become_question_marks() {
        let mut buf = [0u8; STRING_LEN];
        write_string(&mut buf, "a\u{2014}b").unwrap();
        assert_eq!(&buf[..3], b"a?b");
        assert!(buf[3..].iter().all(|&b| b == b' '));
    }

    #[test]
    fn test_length_counts_chars_not_utf8_bytes() {
        let text = "\u{e9}".repeat(STRING_LEN);
        let mut buf = [0u8; STRING_LEN];
        write_string(&mut buf, &text).unwrap();
        assert!(buf.iter().all(|&b| b == 0xE9));

        let err = write_string(&mut buf, &"\u{e9}".repeat(65)).unwrap_err();
        assert!(matches!(err, ProtocolError::StringTooLong(65)));
    }

    #[test]
    fn test_read_string_keeps_leading_spaces() {
        let mut buf = [b' '; STRING_LEN];
        buf[2] = b'a';
        assert_eq!(read_string(&buf), "  a");
    }
}
