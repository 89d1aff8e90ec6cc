use thiserror::Error;

#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("marksheet is missing the `{column}` column")]
    MissingColumn { column: String },
    #[error("marksheet line {line}: grade `{value}` is not a number")]
    InvalidGrade { line: u64, value: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
