use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Port the printer's implicit FTPS server listens on
pub const IMPLICIT_FTPS_PORT: u16 = 990;

/// Default login of the printer's FTP server
pub const DEFAULT_USERNAME: &str = "bblp";

/// Default remote folder holding the timelapse videos
pub const DEFAULT_REMOTE_FOLDER: &str = "timelapse";

/// Extension of the timelapse videos, shared by the local and remote filters
pub const VIDEO_EXTENSION: &str = ".avi";

/// Connection settings for one run against the printer
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

impl ConnectionConfig {
    /// Create a connection config on the implicit FTPS port with the default login
    pub fn new(host: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: IMPLICIT_FTPS_PORT,
            username: DEFAULT_USERNAME.to_string(),
            password: password.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// `host:port` form used for the TCP connect
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Keeps the access code out of debug logs.
impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// What to mirror and where to put it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Local directory the videos are written to
    pub download_dir: PathBuf,
    /// Name of the folder in the remote root to mirror
    pub remote_folder: String,
    /// Whether to remove each file from the printer once it is stored locally
    pub delete_after_download: bool,
    /// Extension (including the dot) a file needs to be considered a video
    pub video_extension: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("./timelapse"),
            remote_folder: DEFAULT_REMOTE_FOLDER.to_string(),
            delete_after_download: false,
            video_extension: VIDEO_EXTENSION.to_string(),
        }
    }
}

impl SyncConfig {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_remote_folder(mut self, folder: impl Into<String>) -> Self {
        self.remote_folder = folder.into();
        self
    }

    pub fn with_delete_after_download(mut self, delete: bool) -> Self {
        self.delete_after_download = delete;
        self
    }

    /// True when `name` carries the configured video extension
    pub fn is_video(&self, name: &str) -> bool {
        name.ends_with(&self.video_extension)
    }
}
