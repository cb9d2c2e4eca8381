//! Content encodings for reads and writes.

use serde::{Deserialize, Serialize};

/// How file bytes map to and from text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Utf8,
    /// One byte per char, U+0000..=U+00FF
    Latin1,
    /// No decoding; reads yield raw bytes
    Binary,
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            "latin1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "binary" | "none" => Ok(Encoding::Binary),
            other => Err(format!("unknown encoding: {}", other)),
        }
    }
}

/// File contents, as read or as a write payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contents {
    Text(String),
    Bytes(Vec<u8>),
}

impl Contents {
    /// Decode raw bytes read from disk.
    pub(crate) fn decode(bytes: Vec<u8>, encoding: Encoding) -> Self {
        match encoding {
            // Invalid sequences become U+FFFD rather than failing the read
            Encoding::Utf8 => Contents::Text(match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }),
            Encoding::Latin1 => Contents::Text(bytes.into_iter().map(char::from).collect()),
            Encoding::Binary => Contents::Bytes(bytes),
        }
    }

    /// Encode into the bytes written to disk.
    ///
    /// Byte payloads are written as-is regardless of `encoding`. Latin-1 keeps
    /// the low byte of each char.
    pub(crate) fn encode(self, encoding: Encoding) -> Vec<u8> {
        match (self, encoding) {
            (Contents::Bytes(bytes), _) => bytes,
            (Contents::Text(text), Encoding::Latin1) => {
                text.chars().map(|c| (u32::from(c) & 0xff) as u8).collect()
            }
            (Contents::Text(text), Encoding::Utf8 | Encoding::Binary) => text.into_bytes(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Contents::Text(text) => text.as_bytes(),
            Contents::Bytes(bytes) => bytes,
        }
    }

    /// The text, if these contents were decoded as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Contents::Text(text) => Some(text),
            Contents::Bytes(_) => None,
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Contents::Text(text) => text.into_bytes(),
            Contents::Bytes(bytes) => bytes,
        }
    }
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Contents::Text(text)
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Contents::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Contents {
    fn from(bytes: Vec<u8>) -> Self {
        Contents::Bytes(bytes)
    }
}

impl From<&[u8]> for Contents {
    fn from(bytes: &[u8]) -> Self {
        Contents::Bytes(bytes.to_vec())
    }
}
