#[derive(Debug, thiserror::Error)]
pub enum Log2CsvError {
    #[error("invalid regular expression syntax: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("the regular expression must contain at least one named capture group")]
    NoNamedGroups,

    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    #[error("line too long: {length} > {max_length} bytes")]
    LineTooLong { length: usize, max_length: usize },

    #[error("write error: {0}")]
    Write(#[from] csv::Error),
}
