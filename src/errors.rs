//! Error types.

/// Alias for [`core::result::Result`] with the crate's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Wire input ended before a complete field could be read.
    Truncated,
    /// A length prefix was out of range (top bit set).
    BadLength,
    /// The algorithm name string in a blob did not match.
    AlgorithmMismatch,
    /// A key failed its consistency checks, or a parsed modulus was zero.
    InvalidKey,
    /// The plaintext does not fit under the key's modulus.
    MessageTooLong,
    /// The signature did not match the signed data.
    Verification,
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Truncated => write!(f, "input truncated"),
            Error::BadLength => write!(f, "invalid length prefix"),
            Error::AlgorithmMismatch => write!(f, "algorithm name mismatch"),
            Error::InvalidKey => write!(f, "invalid key"),
            Error::MessageTooLong => write!(f, "message too long"),
            Error::Verification => write!(f, "verification error"),
        }
    }
}
