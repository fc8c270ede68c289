//! Subtitle text encodings
//!
//! Downloaded subtitles arrive as raw bytes in whatever encoding the
//! uploader used. The source encoding is sniffed from the bytes and is
//! unrelated to the encoding the user wants the `.srt` written in.

use encoding_rs::{
    Encoding, BIG5, EUC_JP, EUC_KR, GB18030, GBK, IBM866, ISO_8859_15, ISO_8859_2, ISO_8859_5,
    ISO_8859_7, KOI8_R, KOI8_U, SHIFT_JIS, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_1258, WINDOWS_874,
};

use crate::errors::{Result, SubDbError};

/// Encodings offered for writing subtitles, in display order
static OUTPUT_ENCODINGS: &[&Encoding] = &[
    UTF_8, UTF_16LE, UTF_16BE, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252, WINDOWS_1253,
    WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257, WINDOWS_1258, WINDOWS_874,
    ISO_8859_2, ISO_8859_5, ISO_8859_7, ISO_8859_15, KOI8_R, KOI8_U, IBM866, SHIFT_JIS, EUC_JP,
    EUC_KR, GBK, GB18030, BIG5,
];

/// Names of the encodings a subtitle can be written in
pub fn available_encodings() -> Vec<&'static str> {
    OUTPUT_ENCODINGS.iter().map(|e| e.name()).collect()
}

/// UTF-16 is written by hand; everything else needs its own encoder
fn is_writable(encoding: &'static Encoding) -> bool {
    encoding == UTF_16LE || encoding == UTF_16BE || encoding.output_encoding() == encoding
}

/// Guess the encoding of downloaded subtitle bytes.
///
/// Byte-order marks win; otherwise valid UTF-8 is taken as UTF-8 and
/// everything else falls back to Windows-1252.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}

/// Decode subtitle bytes with the detected encoding, dropping any BOM.
pub fn decode_subtitle(bytes: &[u8]) -> (String, &'static Encoding) {
    let (body, encoding) = match Encoding::for_bom(bytes) {
        Some((encoding, bom_len)) => (&bytes[bom_len..], encoding),
        None => (bytes, detect_encoding(bytes)),
    };
    let (text, _) = encoding.decode_without_bom_handling(body);
    (text.into_owned(), encoding)
}

/// Target encoding of written subtitles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputEncoding {
    pub encoding: &'static Encoding,
    /// Prefix the file with a byte-order mark (Unicode encodings only)
    pub bom: bool,
}

impl OutputEncoding {
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding,
            bom: false,
        }
    }

    /// Resolve a WHATWG label such as `utf-8`, `latin1` or `windows-1251`.
    ///
    /// Labels of decode-only encodings (`replacement`, which covers
    /// `iso-2022-kr` and `hz-gb-2312`) are refused.
    pub fn from_label(label: &str) -> Result<Self> {
        Encoding::for_label(label.trim().as_bytes())
            .filter(|e| is_writable(*e))
            .map(Self::new)
            .ok_or_else(|| SubDbError::UnknownEncoding(label.to_string()))
    }

    pub fn with_bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    /// Render `text` in this encoding.
    ///
    /// Characters the target cannot represent become numeric character
    /// references.
    pub fn encode(&self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() + 3);
        if self.encoding == UTF_16LE || self.encoding == UTF_16BE {
            let little = self.encoding == UTF_16LE;
            if self.bom {
                let bom: [u8; 2] = if little { [0xFF, 0xFE] } else { [0xFE, 0xFF] };
                out.extend_from_slice(&bom);
            }
            for unit in text.encode_utf16() {
                let bytes = if little { unit.to_le_bytes() } else { unit.to_be_bytes() };
                out.extend_from_slice(&bytes);
            }
            return out;
        }
        if self.bom && self.encoding == UTF_8 {
            out.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        }
        let (bytes, _, _) = self.encoding.encode(text);
        out.extend_from_slice(&bytes);
        out
    }
}

impl Default for OutputEncoding {
    fn default() -> Self {
        Self::new(UTF_8)
    }
}

/// Re-encode downloaded subtitle bytes into `target`.
pub fn transcode(bytes: &[u8], target: &OutputEncoding) -> Vec<u8> {
    let (text, source) = decode_subtitle(bytes);
    log::debug!("Subtitle source encoding {}, writing as {}", source.name(), target.name());
    target.encode(&text)
}
