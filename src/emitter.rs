use std::io::Write;

use crate::error::Log2CsvError;
use crate::pattern::Pattern;
use crate::reader::LineEnding;

/// Serialization settings for the output table.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    pub separator: u8,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        EmitterConfig { separator: b',' }
    }
}

/// Writes the CSV table: a header of group names immediately before the
/// first data row, then one row per matching line. Cells containing the
/// separator, a quote, or a line terminator are quoted, with embedded
/// quotes doubled. Every row ends with the detected line-ending style.
pub struct RowEmitter<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl<W: Write> RowEmitter<W> {
    pub fn new(output: W, line_ending: LineEnding, config: EmitterConfig) -> Self {
        let terminator = match line_ending {
            LineEnding::Crlf => csv::Terminator::CRLF,
            LineEnding::Lf => csv::Terminator::Any(b'\n'),
        };
        let writer = csv::WriterBuilder::new()
            .delimiter(config.separator)
            .terminator(terminator)
            .has_headers(false)
            .from_writer(output);
        RowEmitter {
            writer,
            header_written: false,
        }
    }

    /// Drain the line sequence through the pattern, writing rows as they
    /// are produced. Read and write failures both abort the run; rows
    /// already written stay written, and the output is flushed on every
    /// exit path, with the run error taking precedence over a flush error.
    pub fn emit<I>(&mut self, lines: I, pattern: &Pattern) -> Result<(), Log2CsvError>
    where
        I: IntoIterator<Item = Result<String, Log2CsvError>>,
    {
        let result = self.emit_rows(lines, pattern);
        let flushed = self.flush();
        result.and(flushed)
    }

    fn emit_rows<I>(&mut self, lines: I, pattern: &Pattern) -> Result<(), Log2CsvError>
    where
        I: IntoIterator<Item = Result<String, Log2CsvError>>,
    {
        for line in lines {
            let line = line?;
            let values = match pattern.match_line(&line) {
                Some(values) => values,
                None => continue,
            };
            // A line that matched only structurally, with every capture
            // empty or absent, carries no signal and is dropped.
            if values.iter().all(|v| v.is_empty()) {
                continue;
            }
            if !self.header_written {
                self.write_row(pattern.group_names())?;
                self.header_written = true;
            }
            self.write_row(&values)?;
        }
        Ok(())
    }

    fn write_row<S: AsRef<[u8]>>(&mut self, cells: &[S]) -> Result<(), Log2CsvError> {
        self.writer.write_record(cells)?;
        // Per-row flush so streaming consumers see rows as they appear.
        self.flush()
    }

    fn flush(&mut self) -> Result<(), Log2CsvError> {
        self.writer
            .flush()
            .map_err(|e| Log2CsvError::Write(csv::Error::from(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::{LineReader, ReaderConfig};
    use std::io::Cursor;

    fn emit_to_string(input: &str, pattern: &str, line_ending: LineEnding) -> String {
        let pattern = Pattern::compile(pattern).unwrap();
        let reader = LineReader::new(Cursor::new(input.to_string()), ReaderConfig::default());
        let mut output = Vec::new();
        {
            let mut emitter =
                RowEmitter::new(&mut output, line_ending, EmitterConfig::default());
            emitter.emit(reader, &pattern).unwrap();
        }
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn header_then_one_row_per_matching_line() {
        let input = "2024-01-01T00:00:00+00:00 host1 kernel: msg A\n\
                     2024-01-01T00:00:01+00:00 host2 kernel: msg B\n";
        let output = emit_to_string(input, r"^(?P<ts>\S+)\s+(?P<host>\S+)\s", LineEnding::Lf);
        assert_eq!(
            output,
            "ts,host\n2024-01-01T00:00:00+00:00,host1\n2024-01-01T00:00:01+00:00,host2\n"
        );
    }

    #[test]
    fn crlf_style_applies_to_every_row() {
        let output = emit_to_string("a 1\r\nb 2\r\n", r"^(?P<k>\w+) (?P<v>\d+)$", LineEnding::Crlf);
        assert_eq!(output, "k,v\r\na,1\r\nb,2\r\n");
    }

    #[test]
    fn no_matches_means_no_header() {
        let output = emit_to_string("foo=bar\n", r"^(?P<a>x)?(?P<b>y)?$", LineEnding::Lf);
        assert_eq!(output, "");
    }

    #[test]
    fn all_empty_captures_suppress_the_row() {
        // The pattern matches every line (empty match), but captures nothing.
        let output = emit_to_string("foo\nxy\nbar\n", r"(?P<a>x)?(?P<b>y)?", LineEnding::Lf);
        assert_eq!(output, "a,b\nx,y\n");
    }

    #[test]
    fn non_matching_lines_are_skipped_silently() {
        let input = "a 1\nnope\nb 2\n";
        let output = emit_to_string(input, r"^(?P<k>\w+) (?P<v>\d+)$", LineEnding::Lf);
        assert_eq!(output, "k,v\na,1\nb,2\n");
    }

    #[test]
    fn absent_capture_becomes_empty_cell() {
        let output = emit_to_string("12\n", r"^(?P<a>\d+)(?:-(?P<b>\w+))?$", LineEnding::Lf);
        assert_eq!(output, "a,b\n12,\n");
    }

    #[test]
    fn cells_with_separator_and_quotes_are_escaped() {
        let output = emit_to_string(
            "he said \"hi\", twice\n",
            r"^(?P<msg>.+)$",
            LineEnding::Lf,
        );
        assert_eq!(output, "msg\n\"he said \"\"hi\"\", twice\"\n");
    }

    #[test]
    fn escaped_cell_round_trips_through_a_csv_parser() {
        let value = "a,\"b\",c";
        let output = emit_to_string(&format!("{}\n", value), r"^(?P<msg>.+)$", LineEnding::Lf);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(output.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[0], value);
    }

    #[test]
    fn read_error_aborts_but_keeps_rows_already_written() {
        let pattern = Pattern::compile(r"^(?P<k>\w+) (?P<v>\d+)$").unwrap();
        let lines = vec![
            Ok("a 1".to_string()),
            Err(Log2CsvError::Read(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk error",
            ))),
            Ok("b 2".to_string()),
        ];
        let mut output = Vec::new();
        let err = {
            let mut emitter =
                RowEmitter::new(&mut output, LineEnding::Lf, EmitterConfig::default());
            emitter.emit(lines, &pattern).unwrap_err()
        };
        assert!(matches!(err, Log2CsvError::Read(_)));
        assert_eq!(String::from_utf8(output).unwrap(), "k,v\na,1\n");
    }

    #[test]
    fn custom_separator() {
        let pattern = Pattern::compile(r"^(?P<k>\w+) (?P<v>\d+)$").unwrap();
        let reader = LineReader::new(Cursor::new("a 1\n"), ReaderConfig::default());
        let mut output = Vec::new();
        {
            let mut emitter =
                RowEmitter::new(&mut output, LineEnding::Lf, EmitterConfig { separator: b'\t' });
            emitter.emit(reader, &pattern).unwrap();
        }
        assert_eq!(String::from_utf8(output).unwrap(), "k\tv\na\t1\n");
    }
}
