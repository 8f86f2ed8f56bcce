/// Content value decoding: mixed literal text and |hex| runs
use crate::error::ConvertWarning;

/// One decoded span of a content value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSegment {
    /// Printable text passed through unchanged
    Literal(String),
    /// Decoded hex run
    Bytes(Vec<u8>),
}

impl ContentSegment {
    /// Raw bytes of the segment. Literal codepoints 0-255 map directly to
    /// single bytes so a decoded run round-trips without loss; anything
    /// beyond that keeps its UTF-8 encoding.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            ContentSegment::Bytes(bytes) => bytes.clone(),
            ContentSegment::Literal(text) => {
                let mut out = Vec::with_capacity(text.len());
                for c in text.chars() {
                    let code = c as u32;
                    if code <= 0xFF {
                        out.push(code as u8);
                    } else {
                        let mut buf = [0u8; 4];
                        out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    }
                }
                out
            }
        }
    }
}

/// Decode a raw `content` option value into literal/byte segments.
///
/// Spans between `|` delimiters are whitespace-separated two-character hex
/// tokens; spans outside are literal text. Malformed hex tokens are dropped
/// with a warning and empty runs are discarded; decoding never fails a rule.
pub fn decode_content(raw: &str, warnings: &mut Vec<ConvertWarning>) -> Vec<ContentSegment> {
    let mut segments = Vec::new();

    for (i, span) in raw.split('|').enumerate() {
        if i % 2 == 0 {
            if !span.is_empty() {
                segments.push(ContentSegment::Literal(span.to_string()));
            }
        } else {
            let mut bytes = Vec::new();
            for token in span.split_whitespace() {
                match decode_hex_token(token) {
                    Some(byte) => bytes.push(byte),
                    None => warnings.push(ConvertWarning::MalformedContentToken {
                        token: token.to_string(),
                    }),
                }
            }
            if !bytes.is_empty() {
                segments.push(ContentSegment::Bytes(bytes));
            }
        }
    }

    segments
}

fn decode_hex_token(token: &str) -> Option<u8> {
    if token.len() != 2 {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

/// Re-encode decoded segments as a `\xHH` escape string for the Zeek payload
/// matcher (byte-for-byte round trip).
pub fn escape_bytes(segments: &[ContentSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        for byte in segment.to_bytes() {
            out.push_str(&format!("\\x{:02x}", byte));
        }
    }
    out
}
