//! Crate-wide error type for conditions that escape the dispatcher's own
//! `PrepareResult`/`ExecuteResult` enums (see `dispatcher`): I/O failures,
//! a corrupt database file, and the handful of conditions this design
//! treats as unrecoverable.
use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    /// The file length is not a whole multiple of `PAGE_SIZE`.
    Corrupt(String),
    /// A condition this design does not attempt to recover from
    /// (out-of-range page access, a non-root leaf split, a null-page flush).
    Fatal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error. {}", e),
            Error::Corrupt(msg) => write!(f, "Corrupt database file. {}", msg),
            Error::Fatal(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

/// Builds an `Error::Fatal` with a formatted message, mirroring the shape
/// of the reference codebase's own error-construction macros.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        $crate::errors::Error::Fatal(format!($($arg)*))
    };
}
