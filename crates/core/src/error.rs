use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown {dimension} value: {value}")]
    UnknownDimensionValue {
        dimension: &'static str,
        value: String,
    },
}

pub type CoreResult<T> = Result<T, CoreError>;
