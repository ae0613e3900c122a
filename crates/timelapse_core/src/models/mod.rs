pub mod config;
pub mod remote;
pub mod secure_transport;
pub mod inventory;
pub mod transfer;
pub mod synchronizer;

#[cfg(test)]
mod test_support;

pub use config::{ConnectionConfig, SyncConfig, IMPLICIT_FTPS_PORT, VIDEO_EXTENSION};
pub use remote::{RemoteConnector, RemoteError, RemoteStore};
pub use secure_transport::{FtpsSession, ImplicitTls};
pub use inventory::LocalInventory;
pub use transfer::{format_megabytes, SyncReport, TransferOutcome, TransferUnit};
pub use synchronizer::DownloadSynchronizer;
