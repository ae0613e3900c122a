use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWrite;

use crate::models::config::ConnectionConfig;

/// Errors produced while talking to the printer
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The server answered a listing with `550 No files found`
    #[error("No files found")]
    NoFilesFound,
    #[error("{0}")]
    Ftp(#[from] suppaftp::FtpError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{message}")]
    Protocol { message: String },
}

/// Operations the synchronizer needs from an open session.
///
/// Every call works relative to the session's current directory. Names are
/// passed through exactly as the server listed them.
#[async_trait]
pub trait RemoteStore: Send {
    /// Names in the current directory, in server order (`NLST`)
    async fn list_names(&mut self) -> Result<Vec<String>, RemoteError>;

    async fn change_dir(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Size reported by the server (`SIZE`)
    async fn file_size(&mut self, name: &str) -> Result<u64, RemoteError>;

    /// Stream the binary content of `name` into `sink`, returning the byte count
    async fn retrieve(
        &mut self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, RemoteError>;

    async fn delete(&mut self, name: &str) -> Result<(), RemoteError>;

    async fn quit(&mut self) -> Result<(), RemoteError>;
}

/// Opens authenticated sessions
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    type Session: RemoteStore;

    async fn connect(&self, config: &ConnectionConfig) -> Result<Self::Session, RemoteError>;
}
