use thiserror::Error;

/// Alias for `core::result::Result<T, Error>`.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors from tree construction, cursors and proof handling.
///
/// A proof that fails to verify is not an error: verification reports it as
/// `Ok(false)`. Only failures of the leaf source itself surface here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying byte stream failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The requested leaf range extends past the data that is available.
    #[error("unexpected end of stream")]
    UnexpectedEndOfStream,
    /// A subtree was pushed on top of a smaller pending subtree, which would
    /// break left-to-right leaf order.
    #[error("cannot push subtree of height {height} onto pending subtree of height {top}")]
    InvalidHeight {
        /// Height of the rejected subtree.
        height: u32,
        /// Height of the smallest pending subtree, or 64 when the height is
        /// out of range entirely.
        top: u32,
    },
    /// Invalid constructor parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Malformed serialized proof bytes.
    #[error("invalid data: {0}")]
    InvalidData(String),
}
