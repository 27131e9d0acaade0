//! VideoStore - local directory for generated artifacts.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

/// URL prefix under which the videos directory is served.
pub const VIDEOS_URL_PREFIX: &str = "/videos";

/// Local staging directory for videos produced in-process.
///
/// Files get random names, so concurrent requests never collide and no
/// locking is needed. Nothing is ever cleaned up.
#[derive(Debug, Clone)]
pub struct VideoStore {
    dir: PathBuf,
}

impl VideoStore {
    /// Create a store rooted at `dir`. Does not touch the filesystem.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensure the directory exists, creating it if necessary.
    pub fn ensure_dir_exists(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Generate a fresh filename like `veo3_video_1a2b3c4d.mp4`.
    pub fn unique_filename() -> String {
        let id = uuid::Uuid::new_v4().simple().to_string();
        format!("veo3_video_{}.mp4", &id[..8])
    }

    /// Public URL path for a file in this store.
    pub fn url_for(filename: &str) -> String {
        format!("{}/{}", VIDEOS_URL_PREFIX, filename)
    }

    /// Write `data` under a new unique name and return its URL path.
    pub async fn save(&self, data: &[u8]) -> Result<String, std::io::Error> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let filename = Self::unique_filename();
        let path = self.dir.join(&filename);

        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        log::info!("Video saved as: {}", path.display());
        Ok(Self::url_for(&filename))
    }
}
