//! Command-line argument parsing

use clap::{ArgAction, Parser};
use std::path::PathBuf;
use timelapse_core::models::config::{
    DEFAULT_REMOTE_FOLDER, DEFAULT_USERNAME, IMPLICIT_FTPS_PORT,
};
use timelapse_core::{ConnectionConfig, SyncConfig};

/// Download timelapse videos from the printer's FTP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
pub struct Args {
    /// Printer IP address or hostname
    #[arg(long)]
    pub ip: String,

    /// Implicit FTPS port of the printer
    #[arg(long, default_value_t = IMPLICIT_FTPS_PORT)]
    pub port: u16,

    /// FTP user
    #[arg(long, default_value = DEFAULT_USERNAME)]
    pub user: String,

    /// Printer access code
    #[arg(long, default_value = "")]
    pub password: String,

    /// Local directory for the videos (default: <executable dir>/timelapse)
    #[arg(long = "download_dir")]
    pub download_dir: Option<PathBuf>,

    /// Remote folder holding the timelapse videos
    #[arg(long = "ftp_timelapse_folder", default_value = DEFAULT_REMOTE_FOLDER)]
    pub ftp_timelapse_folder: String,

    /// Remove each video from the printer after it has been downloaded
    #[arg(short = 'd', long = "delete_files_from_sd_card_after_download")]
    pub delete_files_from_sd_card_after_download: bool,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,
}

impl Args {
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig::new(self.ip.clone(), self.password.clone())
            .with_port(self.port)
            .with_username(self.user.clone())
    }

    pub fn sync_config(&self) -> SyncConfig {
        let download_dir = self
            .download_dir
            .clone()
            .unwrap_or_else(default_download_dir);

        SyncConfig::new(download_dir)
            .with_remote_folder(self.ftp_timelapse_folder.clone())
            .with_delete_after_download(self.delete_files_from_sd_card_after_download)
    }
}

/// `timelapse` next to the executable, or in the working directory if that is unknown
fn default_download_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("timelapse")))
        .unwrap_or_else(|| PathBuf::from("timelapse"))
}
