use clap::Parser;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::anyhow;
use log2csv::{convert, EmitterConfig, Pattern, ReaderConfig};

#[derive(Parser)]
#[command(name = "log2csv")]
#[command(about = "Extract named regex captures from log lines into a CSV table")]
#[command(version = "0.1.0")]
#[command(after_help = r"Example:
  log2csv -r '^(?P<ts>\S+)\s+(?P<host>\S+)\s+(?P<facility>\S+):\s+(?P<msg>.*)$' < /var/log/syslog")]
struct Args {
    /// Regular expression with named capture groups, e.g. '(?P<ts>...) (?P<level>...)'
    #[arg(short = 'r', long = "regexp", value_name = "PATTERN")]
    regexp: String,

    /// Input file (default: stdin)
    #[arg(short = 'i', long = "input")]
    input_file: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output_file: Option<PathBuf>,

    /// Maximum line length in bytes
    #[arg(long, default_value = "65536")] // 64KB
    max_line_length: usize,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("log2csv: error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    if args.regexp.trim().is_empty() {
        anyhow::bail!("the --regexp pattern must not be empty");
    }
    let pattern = Pattern::compile(&args.regexp)?;

    let input: Box<dyn Read> = if let Some(input_path) = &args.input_file {
        let file = File::open(input_path)
            .map_err(|e| anyhow!("failed to open input file '{}': {}", input_path.display(), e))?;
        Box::new(file)
    } else {
        Box::new(io::stdin().lock())
    };

    let output: Box<dyn Write> = if let Some(output_path) = &args.output_file {
        let file = File::create(output_path)
            .map_err(|e| anyhow!("failed to create output file '{}': {}", output_path.display(), e))?;
        Box::new(file)
    } else {
        Box::new(io::stdout().lock())
    };

    let reader_config = ReaderConfig {
        max_line_length: args.max_line_length,
        ..ReaderConfig::default()
    };
    convert(input, output, &pattern, reader_config, EmitterConfig::default())?;
    Ok(())
}
