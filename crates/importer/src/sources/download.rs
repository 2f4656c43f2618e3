use std::path::{Path, PathBuf};
use std::time::Duration;

use sha2::{Digest, Sha256};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::config::FetchConfig;
use crate::Result;

const READ_CHUNK: usize = 64 * 1024;

pub struct FileDownloader {
    client: reqwest::Client,
    timeout: Duration,
}

impl FileDownloader {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: config.http_client()?,
            timeout: config.download_timeout,
        })
    }

    /// Streams `url` to `dest`. Failures are logged and reported as `false`
    /// so a batch can move on to the next file.
    pub async fn download(&self, url: &str, dest: &Path) -> bool {
        self.download_with_fingerprint(url, dest).await.is_some()
    }

    /// Like [`download`](Self::download) but also returns the SHA-256 of the
    /// body as lowercase hex.
    pub async fn download_with_fingerprint(&self, url: &str, dest: &Path) -> Option<String> {
        match self.try_download(url, dest).await {
            Ok(fingerprint) => {
                debug!("Downloaded {} to {}", url, dest.display());
                Some(fingerprint)
            }
            Err(e) => {
                warn!("Download of {} failed: {}", url, e);
                None
            }
        }
    }

    async fn try_download(&self, url: &str, dest: &Path) -> Result<String> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        // The body lands in a sibling file first so `dest` never holds a
        // truncated download.
        let partial = partial_path(dest);
        let mut file = File::create(&partial).await?;
        let mut hasher = Sha256::new();

        let streamed: Result<()> = async {
            while let Some(chunk) = response.chunk().await? {
                hasher.update(&chunk);
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            Ok(())
        }
        .await;
        drop(file);

        if let Err(e) = streamed {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }

        tokio::fs::rename(&partial, dest).await?;
        Ok(format!("{:x}", hasher.finalize()))
    }
}

fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}

/// SHA-256 of a file on disk, read in bounded chunks.
pub async fn fingerprint_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; READ_CHUNK];
    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_path_is_sibling() {
        let dest = Path::new("/tmp/ratings/rating_2024-03-15.xlsx");
        assert_eq!(
            partial_path(dest),
            PathBuf::from("/tmp/ratings/rating_2024-03-15.xlsx.part")
        );
    }

    #[tokio::test]
    async fn test_fingerprint_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.bin");
        tokio::fs::write(&path, b"abc").await.unwrap();

        assert_eq!(
            fingerprint_file(&path).await.unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[tokio::test]
    async fn test_download_failure_returns_false() {
        let dir = TempDir::new().unwrap();
        let config = FetchConfig {
            download_timeout: Duration::from_secs(2),
            ..FetchConfig::default()
        };
        let downloader = FileDownloader::new(&config).unwrap();
        let dest = dir.path().join("nested").join("rating.xlsx");

        // Port 9 on localhost refuses connections.
        let ok = downloader.download("http://127.0.0.1:9/rating.xlsx", &dest).await;

        assert!(!ok);
        assert!(!dest.exists());
        assert!(!partial_path(&dest).exists());
        assert!(dest.parent().unwrap().exists());
    }
}
