//! Character encodings tried for delimited text.

use std::fmt;

use encoding_rs::WINDOWS_1252;

/// Encodings in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    /// Latin-1 restricted to printable code points (no C1 controls).
    Latin1,
    Windows1252,
    /// Full ISO-8859-1 byte mapping, C1 controls included.
    Iso8859_1,
}

impl TextEncoding {
    /// Every encoding in the order the loader tries them.
    pub const PRIORITY: [TextEncoding; 4] =
        [Self::Utf8, Self::Latin1, Self::Windows1252, Self::Iso8859_1];

    /// Strictly decodes `bytes`; `None` when they are not valid text in this
    /// encoding.
    ///
    /// NUL bytes are never valid text. A UTF-8 byte-order mark is dropped.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        if bytes.contains(&0) {
            return None;
        }
        match self {
            Self::Utf8 => {
                let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(str::to_string)
            }
            Self::Latin1 => {
                if bytes.iter().any(|b| (0x80..=0x9F).contains(b)) {
                    None
                } else {
                    Some(latin1_to_string(bytes))
                }
            }
            Self::Windows1252 => WINDOWS_1252
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(std::borrow::Cow::into_owned),
            Self::Iso8859_1 => Some(latin1_to_string(bytes)),
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin-1",
            Self::Windows1252 => "windows-1252",
            Self::Iso8859_1 => "iso-8859-1",
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decodes every byte as the code point of the same value. Never fails.
#[must_use]
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_strips_bom_and_rejects_latin1() {
        assert_eq!(
            TextEncoding::Utf8.decode(b"\xEF\xBB\xBFa,b").as_deref(),
            Some("a,b")
        );
        assert_eq!(TextEncoding::Utf8.decode(b"ni\xF1o"), None);
    }

    #[test]
    fn test_latin1_decodes_spanish_text() {
        assert_eq!(
            TextEncoding::Latin1.decode(b"ni\xF1o;a\xF1o").as_deref(),
            Some("niño;año")
        );
    }

    #[test]
    fn test_c1_bytes_fall_through_to_windows_1252() {
        let quoted = b"\x93hola\x94";
        assert_eq!(TextEncoding::Latin1.decode(quoted), None);
        assert_eq!(
            TextEncoding::Windows1252.decode(quoted).as_deref(),
            Some("\u{201C}hola\u{201D}")
        );
        assert_eq!(
            TextEncoding::Iso8859_1.decode(quoted).as_deref(),
            Some("\u{93}hola\u{94}")
        );
    }

    #[test]
    fn test_nul_bytes_are_not_text() {
        for encoding in TextEncoding::PRIORITY {
            assert_eq!(encoding.decode(b"PK\x03\x04\x00\x00"), None, "{encoding}");
        }
    }
}
