use std::path::Path;

use tokio::fs::{self, File as TokioFile};
use tokio::io::AsyncWriteExt;

use crate::errors::{SyncError, SyncResult};
use crate::models::config::{ConnectionConfig, SyncConfig};
use crate::models::inventory::LocalInventory;
use crate::models::remote::{RemoteConnector, RemoteError, RemoteStore};
use crate::models::transfer::{format_megabytes, SyncReport, TransferOutcome, TransferUnit};

/// Mirrors new videos from the printer's timelapse folder into a local directory.
///
/// A run goes through four phases in order:
/// 1. snapshot the videos already present locally,
/// 2. connect and authenticate,
/// 3. enter the remote folder and pick the videos not seen locally,
/// 4. transfer them one at a time.
///
/// Failures in the first three phases end the run with a [`SyncError`].
/// Failures of a single file are logged, recorded in the [`SyncReport`] and
/// the loop moves on to the next file.
pub struct DownloadSynchronizer<C: RemoteConnector> {
    connector: C,
    connection: ConnectionConfig,
    config: SyncConfig,
}

impl<C: RemoteConnector> DownloadSynchronizer<C> {
    pub fn new(connector: C, connection: ConnectionConfig, config: SyncConfig) -> Self {
        Self {
            connector,
            connection,
            config,
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one synchronization pass
    pub async fn run(&self) -> SyncResult<SyncReport> {
        let inventory =
            LocalInventory::scan(&self.config.download_dir, &self.config.video_extension).await?;

        log::info!(
            "Connecting to printer {}@{}:{}",
            self.connection.username,
            self.connection.host,
            self.connection.port
        );
        let mut session = self
            .connector
            .connect(&self.connection)
            .await
            .map_err(SyncError::Connection)?;
        log::info!("Connected.");

        let result = self.sync_session(&mut session, &inventory).await;

        if let Err(e) = session.quit().await {
            log::debug!("Failed to close FTP session: {}", e);
        }

        result
    }

    async fn sync_session(
        &self,
        session: &mut C::Session,
        inventory: &LocalInventory,
    ) -> SyncResult<SyncReport> {
        self.enter_remote_folder(session).await?;

        let candidates = self.list_candidates(session, inventory).await?;
        let mut report = SyncReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        if !candidates.is_empty() {
            log::info!("Found {} files for download.", candidates.len());
        }

        for name in &candidates {
            let outcome = self.transfer(session, name).await;
            report.record(outcome);
        }

        log::info!("{}", report.summary());
        Ok(report)
    }

    async fn enter_remote_folder(&self, session: &mut C::Session) -> SyncResult<()> {
        let folder = &self.config.remote_folder;
        let root = match session.list_names().await {
            Ok(names) => names,
            Err(RemoteError::NoFilesFound) => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        if !root.iter().any(|name| name == folder) {
            return Err(SyncError::FolderNotFound {
                folder: folder.clone(),
            });
        }

        session.change_dir(folder).await?;
        log::debug!("Changed into remote folder {}", folder);
        Ok(())
    }

    /// Videos in the current remote directory that are not in `inventory`, in listing order
    async fn list_candidates(
        &self,
        session: &mut C::Session,
        inventory: &LocalInventory,
    ) -> SyncResult<Vec<String>> {
        log::info!(
            "Looking {} files for download.",
            self.config.video_extension.trim_start_matches('.')
        );

        let listing = match session.list_names().await {
            Ok(names) => names,
            Err(RemoteError::NoFilesFound) => {
                log::info!("No files in this directory");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(SyncError::Listing {
                    folder: self.config.remote_folder.clone(),
                    source,
                });
            }
        };

        Ok(select_candidates(listing, inventory, &self.config))
    }

    async fn transfer(&self, session: &mut C::Session, name: &str) -> TransferOutcome {
        let size = match session.file_size(name).await {
            Ok(size) => size,
            Err(e) => {
                log::error!(
                    "failed to query size of file {}: {}, continue with next file",
                    name,
                    e
                );
                return TransferOutcome::Failed {
                    name: name.to_string(),
                    error: e.to_string(),
                };
            }
        };

        if size == 0 {
            log::info!("Filesize of file {} is 0, skipping file and continue", name);
            return TransferOutcome::SkippedEmpty {
                name: name.to_string(),
            };
        }

        let unit = TransferUnit::new(name, size, &self.config.download_dir);
        log::info!(
            "Downloading file \"{}\" size: {} MB",
            unit.name,
            format_megabytes(unit.size)
        );

        let bytes = match fetch(session, &unit).await {
            Ok(bytes) => bytes,
            Err(e) => {
                discard_partial(&unit.local_path).await;
                log::error!(
                    "failed to download file {}: {}, continue with next file",
                    unit.name,
                    e
                );
                return TransferOutcome::Failed {
                    name: unit.name,
                    error: e.to_string(),
                };
            }
        };
        log::debug!("Stored {} ({} bytes)", unit.local_path.display(), bytes);

        if self.config.delete_after_download {
            if let Err(e) = session.delete(&unit.name).await {
                log::error!(
                    "Failed to delete file {} after download: {}, continue with next file",
                    unit.name,
                    e
                );
                return TransferOutcome::DeleteFailed {
                    name: unit.name,
                    bytes,
                    error: e.to_string(),
                };
            }
            log::debug!("Deleted {} from printer", unit.name);
        }

        TransferOutcome::Downloaded {
            name: unit.name,
            bytes,
        }
    }
}

/// Keep names with the video extension that are not already stored locally
pub fn select_candidates(
    listing: Vec<String>,
    inventory: &LocalInventory,
    config: &SyncConfig,
) -> Vec<String> {
    listing
        .into_iter()
        .filter(|name| config.is_video(name))
        .filter(|name| !inventory.contains(name))
        .collect()
}

async fn fetch<S: RemoteStore>(
    session: &mut S,
    unit: &TransferUnit,
) -> Result<u64, RemoteError> {
    let mut local_file = TokioFile::create(&unit.local_path).await?;
    let result = session.retrieve(&unit.name, &mut local_file).await;

    // Settle pending writes so the handle is closed when dropped.
    if let Err(e) = local_file.flush().await {
        log::debug!("Flushing {} failed: {}", unit.local_path.display(), e);
    }
    drop(local_file);

    result
}

async fn discard_partial(path: &Path) {
    match fs::remove_file(path).await {
        Ok(()) => log::debug!("Removed partial file {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove partial file {}: {}", path.display(), e),
    }
}
