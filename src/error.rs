use thiserror::Error;

#[derive(Error, Debug)]
pub enum YdlError {
    #[error("Not a YDL preset file: missing `DTAB01d` header")]
    NotYdl,

    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    #[error("No patch {index} in bank of {count} patches")]
    PatchIndex { index: usize, count: usize },

    #[error("Bad IO")]
    Io(#[from] std::io::Error),
}
