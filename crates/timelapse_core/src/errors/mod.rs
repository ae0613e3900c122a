use thiserror::Error;

use crate::models::remote::RemoteError;

/// Run-aborting failures of a synchronization run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("FTP connection failed, error: \"{0}\"")]
    Connection(#[source] RemoteError),

    #[error("{folder} not found on ftp server.")]
    FolderNotFound { folder: String },

    #[error("Listing of {folder} failed: {source}")]
    Listing {
        folder: String,
        #[source]
        source: RemoteError,
    },

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for fallible operations in the core crate
pub type SyncResult<T> = Result<T, SyncError>;
