use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::errors::SummarizerError;
use crate::remote::SummaryClient;

/// Opens a link outside the popup, the way the browser opens a new tab.
#[async_trait]
pub trait LinkOpener: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the link could not be opened.
    async fn open(&self, url: &str) -> Result<(), SummarizerError>;
}

/// Prints the link for the user to follow.
#[derive(Debug, Default)]
pub struct PrintOpener;

#[async_trait]
impl LinkOpener for PrintOpener {
    async fn open(&self, url: &str) -> Result<(), SummarizerError> {
        println!("{url}");
        Ok(())
    }
}

/// Follows the link and saves the served file into a directory.
pub struct SaveToDirOpener {
    client: Arc<SummaryClient>,
    dir: PathBuf,
}

impl SaveToDirOpener {
    #[must_use]
    pub fn new(client: Arc<SummaryClient>, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl LinkOpener for SaveToDirOpener {
    async fn open(&self, url: &str) -> Result<(), SummarizerError> {
        let file = self.client.fetch_file(url).await?;
        tokio::fs::create_dir_all(&self.dir).await?;
        // The name comes from the server; keep only its final component.
        let name = Path::new(&file.filename)
            .file_name()
            .map_or_else(|| "summary.txt".into(), |n| n.to_os_string());
        let path = self.dir.join(name);
        tokio::fs::write(&path, file.body.as_bytes()).await?;
        info!(path = %path.display(), "Summary saved");
        println!("{}", path.display());
        Ok(())
    }
}
