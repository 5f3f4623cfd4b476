// src/lib.rs
pub mod emitter;
pub mod error;
pub mod pattern;
pub mod reader;

pub use emitter::{EmitterConfig, RowEmitter};
pub use error::Log2CsvError;
pub use pattern::Pattern;
pub use reader::{LineEnding, LineReader, ReaderConfig};

use std::io::{Read, Write};

/// Run the whole conversion: detect the output line ending from `input`,
/// then stream matching lines into `output` as CSV rows.
pub fn convert<R: Read, W: Write>(
    input: R,
    output: W,
    pattern: &Pattern,
    reader_config: ReaderConfig,
    emitter_config: EmitterConfig,
) -> Result<(), Log2CsvError> {
    let mut reader = LineReader::new(input, reader_config);
    let line_ending = reader.detect_line_ending()?;
    let mut emitter = RowEmitter::new(output, line_ending, emitter_config);
    emitter.emit(reader, pattern)
}
