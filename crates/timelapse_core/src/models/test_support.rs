//! Scripted in-memory printer for exercising the synchronizer.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::models::config::ConnectionConfig;
use crate::models::remote::{RemoteConnector, RemoteError, RemoteStore};

#[derive(Debug, Clone, Default)]
struct ScriptedFile {
    name: String,
    content: Vec<u8>,
    break_mid_stream: bool,
    refuse_delete: bool,
    refuse_size: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FolderListing {
    Files,
    NoFilesFound,
    Broken,
}

/// What the synchronizer asked the printer to do
#[derive(Debug, Default)]
pub(crate) struct Journal {
    pub listings: usize,
    pub cwd: Vec<String>,
    pub retrieved: Vec<String>,
    pub deleted: Vec<String>,
    pub quit: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct FakePrinter {
    folder: String,
    folder_present: bool,
    folder_listing: FolderListing,
    refuse_connection: bool,
    files: Vec<ScriptedFile>,
    journal: Arc<Mutex<Journal>>,
}

impl FakePrinter {
    pub fn new(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            folder_present: true,
            folder_listing: FolderListing::Files,
            refuse_connection: false,
            files: Vec::new(),
            journal: Arc::new(Mutex::new(Journal::default())),
        }
    }

    pub fn journal(&self) -> Arc<Mutex<Journal>> {
        self.journal.clone()
    }

    fn push(mut self, file: ScriptedFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_file(self, name: &str, content: &[u8]) -> Self {
        self.push(ScriptedFile {
            name: name.to_string(),
            content: content.to_vec(),
            ..Default::default()
        })
    }

    /// Sends `content` and then drops the data connection
    pub fn with_broken_transfer(self, name: &str, content: &[u8]) -> Self {
        self.push(ScriptedFile {
            name: name.to_string(),
            content: content.to_vec(),
            break_mid_stream: true,
            ..Default::default()
        })
    }

    pub fn with_undeletable_file(self, name: &str, content: &[u8]) -> Self {
        self.push(ScriptedFile {
            name: name.to_string(),
            content: content.to_vec(),
            refuse_delete: true,
            ..Default::default()
        })
    }

    pub fn with_unsized_file(self, name: &str, content: &[u8]) -> Self {
        self.push(ScriptedFile {
            name: name.to_string(),
            content: content.to_vec(),
            refuse_size: true,
            ..Default::default()
        })
    }

    pub fn without_folder(mut self) -> Self {
        self.folder_present = false;
        self
    }

    pub fn with_no_files_found(mut self) -> Self {
        self.folder_listing = FolderListing::NoFilesFound;
        self
    }

    pub fn with_listing_error(mut self) -> Self {
        self.folder_listing = FolderListing::Broken;
        self
    }

    pub fn refusing_connections(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    fn find(&self, name: &str) -> Result<&ScriptedFile, RemoteError> {
        self.files
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| RemoteError::Protocol {
                message: format!("550 {}: No such file", name),
            })
    }
}

#[async_trait]
impl RemoteConnector for FakePrinter {
    type Session = FakeSession;

    async fn connect(&self, _config: &ConnectionConfig) -> Result<FakeSession, RemoteError> {
        if self.refuse_connection {
            return Err(RemoteError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )));
        }
        Ok(FakeSession {
            printer: self.clone(),
            in_folder: false,
        })
    }
}

pub(crate) struct FakeSession {
    printer: FakePrinter,
    in_folder: bool,
}

impl FakeSession {
    fn journal(&self) -> std::sync::MutexGuard<'_, Journal> {
        self.printer.journal.lock().unwrap()
    }
}

#[async_trait]
impl RemoteStore for FakeSession {
    async fn list_names(&mut self) -> Result<Vec<String>, RemoteError> {
        self.journal().listings += 1;

        if !self.in_folder {
            let mut root = vec!["cache".to_string(), "model".to_string()];
            if self.printer.folder_present {
                root.push(self.printer.folder.clone());
            }
            return Ok(root);
        }

        match self.printer.folder_listing {
            FolderListing::Files => Ok(self.printer.files.iter().map(|f| f.name.clone()).collect()),
            FolderListing::NoFilesFound => Err(RemoteError::NoFilesFound),
            FolderListing::Broken => Err(RemoteError::Protocol {
                message: "425 Can't open data connection".to_string(),
            }),
        }
    }

    async fn change_dir(&mut self, path: &str) -> Result<(), RemoteError> {
        self.journal().cwd.push(path.to_string());
        self.in_folder = true;
        Ok(())
    }

    async fn file_size(&mut self, name: &str) -> Result<u64, RemoteError> {
        let file = self.printer.find(name)?;
        if file.refuse_size {
            return Err(RemoteError::Protocol {
                message: "550 Could not get file size".to_string(),
            });
        }
        Ok(file.content.len() as u64)
    }

    async fn retrieve(
        &mut self,
        name: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u64, RemoteError> {
        self.journal().retrieved.push(name.to_string());
        let file = self.printer.find(name)?.clone();

        sink.write_all(&file.content).await?;
        if file.break_mid_stream {
            return Err(RemoteError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset by peer",
            )));
        }
        sink.flush().await?;
        Ok(file.content.len() as u64)
    }

    async fn delete(&mut self, name: &str) -> Result<(), RemoteError> {
        let file = self.printer.find(name)?;
        if file.refuse_delete {
            return Err(RemoteError::Protocol {
                message: "550 Permission denied".to_string(),
            });
        }
        self.journal().deleted.push(name.to_string());
        Ok(())
    }

    async fn quit(&mut self) -> Result<(), RemoteError> {
        self.journal().quit = true;
        Ok(())
    }
}
