use std::collections::HashSet;
use std::path::Path;

use tokio::fs;

/// Videos already present in the download directory when the run starts.
///
/// Taken once and never refreshed, so files written during the run do not
/// show up here.
#[derive(Debug, Clone, Default)]
pub struct LocalInventory {
    names: HashSet<String>,
}

impl LocalInventory {
    /// Create the directory if needed and record every entry ending in `extension`
    pub async fn scan<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Self, std::io::Error> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;

        let mut names = HashSet::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.ends_with(extension) {
                names.insert(name);
            }
        }

        log::debug!(
            "{} file(s) with extension {} already in {}",
            names.len(),
            extension,
            dir.display()
        );
        Ok(Self { names })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for LocalInventory {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(Into::into).collect(),
        }
    }
}
