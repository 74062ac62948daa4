use std::char::REPLACEMENT_CHARACTER;

/// Incremental UTF-8 decoder for byte chunks read off the port.
///
/// A multi-byte character cut in half by a read boundary is completed on the
/// next call. Invalid bytes decode to U+FFFD and are counted.
#[derive(Debug, Default)]
pub struct TextDecoder {
    pending: Vec<u8>,
    decode_errors: u64,
}

impl TextDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut out = String::with_capacity(input.len());
        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            out.push(REPLACEMENT_CHARACTER);
                            self.decode_errors += 1;
                            rest = &rest[valid + len..];
                        }
                        // Incomplete sequence at the end, wait for more bytes
                        None => {
                            self.pending = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush at stream end. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        self.decode_errors += 1;
        REPLACEMENT_CHARACTER.to_string()
    }

    pub fn decode_errors(&self) -> u64 {
        self.decode_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = TextDecoder::new();
        assert_eq!(decoder.decode(b"Orientation:1,2,3\n"), "Orientation:1,2,3\n");
        assert_eq!(decoder.decode_errors(), 0);
    }

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "x°y".as_bytes();
        let mut decoder = TextDecoder::new();
        assert_eq!(decoder.decode(&bytes[..2]), "x");
        assert_eq!(decoder.decode(&bytes[2..]), "°y");
        assert_eq!(decoder.finish(), "");
        assert_eq!(decoder.decode_errors(), 0);
    }

    #[test]
    fn test_invalid_byte_is_replaced() {
        let mut decoder = TextDecoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
        assert_eq!(decoder.decode_errors(), 1);
    }

    #[test]
    fn test_dangling_sequence_at_stream_end() {
        let mut decoder = TextDecoder::new();
        assert_eq!(decoder.decode(&[b'z', 0xE2, 0x82]), "z");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.decode_errors(), 1);
    }
}
