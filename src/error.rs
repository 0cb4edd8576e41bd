use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, covering every failure this crate can surface.
///
/// The variants map onto the failure taxonomy the patch run is built around:
/// per-descriptor failures ([`Error::NotFound`], [`Error::Unsupported`]) are
/// recorded and skipped, structural failures ([`Error::Malformed`],
/// [`Error::OutOfBounds`]) abort patching of the affected artifact, and
/// environment failures ([`Error::Io`], [`Error::Fetch`], [`Error::Signing`])
/// abort the whole run at the step where they occur.
///
/// # Examples
///
/// ```rust
/// use apkpatch::{Error, dex::DexImage};
///
/// match DexImage::parse(vec![0u8; 4]) {
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("bad image: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("other error: {}", e),
///     Ok(_) => unreachable!("four bytes are never a valid image"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A named patch target (type, member, or file) does not exist.
    ///
    /// Non-fatal: the orchestrator records the descriptor as skipped and
    /// continues with the next one.
    #[error("Not found - {0}")]
    NotFound(String),

    /// The artifact is damaged or does not conform to its format.
    ///
    /// Includes the source location where the malformation was detected,
    /// for debugging against hostile or truncated inputs.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing an artifact.
    ///
    /// Safety check preventing buffer overruns when index tables declare
    /// offsets or counts that run past the end of the image.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// A patch descriptor carries an operation tag this crate does not know.
    ///
    /// Treated like [`Error::NotFound`]: the descriptor is skipped and the
    /// run continues.
    #[error("Unsupported patch operation - {0}")]
    Unsupported(String),

    /// File I/O error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Error from the zip crate while reading a package container.
    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    /// A patch document failed to parse as JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The patch list could not be retrieved.
    ///
    /// Network or lookup failure while fetching the descriptor document.
    /// Fatal: a run cannot proceed without its patch list.
    #[error("Failed to fetch patch list - {0}")]
    Fetch(String),

    /// Every available signing mechanism failed.
    #[error("Signing failed - {0}")]
    Signing(String),
}
