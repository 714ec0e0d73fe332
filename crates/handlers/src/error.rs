use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the bundled preparers and handlers.
#[derive(Debug, Error)]
pub enum Error {
    /// The output directory could not be created.
    #[error("failed to create output directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was requested.
        path: PathBuf,

        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// File involved.
        path: PathBuf,

        /// Underlying failure.
        #[source]
        source: io::Error,
    },

    /// The file to publish does not exist.
    #[error("file not found: {}", path.display())]
    NotFound {
        /// Missing file.
        path: PathBuf,
    },
}
