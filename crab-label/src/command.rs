//! Command buffer builder
//!
//! Line-oriented byte buffer shared by all emitters. Text is encoded on the
//! way in, so binary payloads (bitmaps) can be mixed with command lines.

use crate::encoding::encode_cp1252;

/// How command text is turned into bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Cp1252,
}

/// Printer command builder
pub struct CommandBuilder {
    buf: Vec<u8>,
    encoding: TextEncoding,
    line_ending: &'static [u8],
}

impl CommandBuilder {
    /// Create a builder with the language's text encoding and line terminator
    pub fn new(encoding: TextEncoding, line_ending: &'static str) -> Self {
        Self {
            buf: Vec::with_capacity(1024),
            encoding,
            line_ending: line_ending.as_bytes(),
        }
    }

    // === Text Output ===

    /// Write text in the builder's encoding
    pub fn text(&mut self, s: &str) -> &mut Self {
        match self.encoding {
            TextEncoding::Utf8 => self.buf.extend_from_slice(s.as_bytes()),
            TextEncoding::Cp1252 => self.buf.extend_from_slice(&encode_cp1252(s)),
        }
        self
    }

    /// Write one command line
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s);
        self.newline()
    }

    /// Write the line terminator alone
    pub fn newline(&mut self) -> &mut Self {
        self.buf.extend_from_slice(self.line_ending);
        self
    }

    // === Raw Commands ===

    /// Write raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    // === Build ===

    /// Finish and return the byte buffer
    pub fn build(self) -> Vec<u8> {
        self.buf
    }
}
