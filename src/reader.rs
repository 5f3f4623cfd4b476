use std::io::{self, Read};

use crate::error::Log2CsvError;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Line-ending convention detected once from the input stream and applied
/// uniformly to every output row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    Crlf,
}

/// Size limits for the line reader.
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Longest single line accepted; a longer line aborts the run. Also the
    /// size of the look-ahead window for line-ending detection.
    pub max_line_length: usize,
    /// Hard ceiling on internal buffering, independent of the line cap.
    pub max_buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            max_line_length: 64 * 1024,        // 64KB
            max_buffer_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Buffering line reader over a raw byte stream.
///
/// Supports a bounded look-ahead for line-ending detection; the peeked bytes
/// stay in the buffer and are replayed by the line iteration, so detection
/// never loses or duplicates input. Yields lines with their terminators
/// stripped, splitting on LF and CRLF alike regardless of the detected
/// style. Input is decoded as UTF-8 with replacement, since log streams are
/// not reliably clean.
pub struct LineReader<R: Read> {
    input: R,
    config: ReaderConfig,
    buf: Vec<u8>,
    // Bytes already scanned for a terminator, to avoid rescanning on refill.
    scanned: usize,
    eof: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(input: R, config: ReaderConfig) -> Self {
        LineReader {
            input,
            config,
            buf: Vec::new(),
            scanned: 0,
            eof: false,
        }
    }

    /// Detect the line-ending style from the first terminator within the
    /// look-ahead window. No terminator found, or a bare LF, means LF; an
    /// LF preceded by a CR means CRLF.
    pub fn detect_line_ending(&mut self) -> Result<LineEnding, Log2CsvError> {
        while !self.eof && self.buf.len() < self.config.max_line_length {
            if self.buf.iter().any(|&b| b == b'\n') {
                break;
            }
            self.fill_more()?;
        }
        match self.buf.iter().position(|&b| b == b'\n') {
            Some(idx) if idx > 0 && self.buf[idx - 1] == b'\r' => Ok(LineEnding::Crlf),
            _ => Ok(LineEnding::Lf),
        }
    }

    fn fill_more(&mut self) -> Result<(), Log2CsvError> {
        if self.buf.len() >= self.config.max_buffer_size {
            return Err(Log2CsvError::Read(io::Error::new(
                io::ErrorKind::Other,
                format!(
                    "input buffer exceeded {} bytes",
                    self.config.max_buffer_size
                ),
            )));
        }
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.input.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Log2CsvError::Read(e)),
            }
        }
    }

    fn take_line(&mut self, len: usize, terminated: bool) -> String {
        let mut line: Vec<u8> = self.buf.drain(..len + usize::from(terminated)).collect();
        if terminated {
            line.pop(); // '\n'
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        self.scanned = 0;
        String::from_utf8_lossy(&line).into_owned()
    }

    fn next_line(&mut self) -> Option<Result<String, Log2CsvError>> {
        loop {
            if let Some(off) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') {
                let idx = self.scanned + off;
                // The cap applies to the logical line, terminator excluded.
                let length = if idx > 0 && self.buf[idx - 1] == b'\r' {
                    idx - 1
                } else {
                    idx
                };
                if length > self.config.max_line_length {
                    return Some(Err(Log2CsvError::LineTooLong {
                        length,
                        max_length: self.config.max_line_length,
                    }));
                }
                return Some(Ok(self.take_line(idx, true)));
            }
            self.scanned = self.buf.len();
            // Tolerate a CRLF terminator still in flight before flagging.
            if self.buf.len() > self.config.max_line_length.saturating_add(2) {
                return Some(Err(Log2CsvError::LineTooLong {
                    length: self.buf.len(),
                    max_length: self.config.max_line_length,
                }));
            }
            if self.eof {
                if self.buf.is_empty() {
                    return None;
                }
                let length = if self.buf.last() == Some(&b'\r') {
                    self.buf.len() - 1
                } else {
                    self.buf.len()
                };
                if length > self.config.max_line_length {
                    return Some(Err(Log2CsvError::LineTooLong {
                        length,
                        max_length: self.config.max_line_length,
                    }));
                }
                let len = self.buf.len();
                return Some(Ok(self.take_line(len, false)));
            }
            if let Err(e) = self.fill_more() {
                return Some(Err(e));
            }
        }
    }
}

impl<R: Read> Iterator for LineReader<R> {
    type Item = Result<String, Log2CsvError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}
