//! File type detection from magic numbers.
//!
//! Only the first [`SNIFF_WINDOW`] bytes are looked at. [`classify`] works on
//! a buffer already in hand; [`Sniffer`] collects those bytes from a stream
//! so downloads can be classified without a second read.

use serde::{Deserialize, Serialize};

/// Number of leading bytes inspected when classifying content
pub const SNIFF_WINDOW: usize = 8;

/// File types recognised from magic numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    Png,
    Jpeg,
    Gif,
    Pdf,
    Unknown,
}

impl FileType {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            FileType::Png => "PNG",
            FileType::Jpeg => "JPEG",
            FileType::Gif => "GIF",
            FileType::Pdf => "PDF",
            FileType::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Signature table, checked in order. First match wins.
pub const SIGNATURES: &[(&[u8], FileType)] = &[
    (&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A], FileType::Png),
    (&[0xFF, 0xD8, 0xFF, 0xE0], FileType::Jpeg),
    (&[0xFF, 0xD8, 0xFF, 0xE1], FileType::Jpeg),
    (&[0x47, 0x49, 0x46, 0x38], FileType::Gif),
    (&[0x25, 0x50, 0x44, 0x46], FileType::Pdf),
];

/// Classify a buffer by its first [`SNIFF_WINDOW`] bytes
pub fn classify(buffer: &[u8]) -> FileType {
    let window = &buffer[..buffer.len().min(SNIFF_WINDOW)];
    SIGNATURES
        .iter()
        .find(|(magic, _)| window.starts_with(magic))
        .map(|(_, file_type)| *file_type)
        .unwrap_or(FileType::Unknown)
}

/// Collects the header of a stream as chunks arrive.
#[derive(Debug, Default)]
pub struct Sniffer {
    header: Vec<u8>,
}

impl Sniffer {
    /// Empty sniffer; classifies as `Unknown` until fed
    pub fn new() -> Self {
        Self {
            header: Vec::with_capacity(SNIFF_WINDOW),
        }
    }

    /// Feed the next chunk; only the bytes still missing from the window are kept
    pub fn feed(&mut self, chunk: &[u8]) {
        let missing = SNIFF_WINDOW - self.header.len();
        self.header.extend_from_slice(&chunk[..chunk.len().min(missing)]);
    }

    /// True once the full window has been seen
    pub fn is_full(&self) -> bool {
        self.header.len() == SNIFF_WINDOW
    }

    /// Classify what has been collected so far
    pub fn classify(&self) -> FileType {
        classify(&self.header)
    }
}
