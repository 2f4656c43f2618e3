mod common;

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use importer::{
    CatalogFetcher, FetchConfig, FileDownloader, FileOutcome, RemoteFetchOptions, fetch_remote,
};
use storage::{MemoryStore, RatingStore};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serves fixed bodies by request path over plain HTTP/1.1.
async fn serve(routes: HashMap<String, Vec<u8>>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut chunk = [0u8; 1024];
                loop {
                    let read = socket.read(&mut chunk).await.unwrap_or(0);
                    if read == 0 {
                        break;
                    }
                    request.extend_from_slice(&chunk[..read]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&request);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let response = match routes.get(&path) {
                    Some(body) => {
                        let mut response = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        )
                        .into_bytes();
                        response.extend_from_slice(body);
                        response
                    }
                    None => b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
                        .to_vec(),
                };
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

const INDEX: &str = r#"<html><body>
  <a href="/files/rating_2024-01-15.xlsx">Январь</a>
  <a href="/files/rating_2024-03-01.xlsx">Март</a>
  <a href="/files/feb.xlsx">Рейтинг на 15.02.2024</a>
  <a href="/files/rating_2024-01-15.xlsx">Январь (копия)</a>
  <a href="/files/latest.xlsx">Текущий</a>
</body></html>"#;

struct Archive {
    addr: SocketAddr,
    _fixtures: TempDir,
}

async fn archive() -> Archive {
    let fixtures = TempDir::new().unwrap();
    let january = fixtures.path().join("january.xlsx");
    let february = fixtures.path().join("february.xlsx");
    common::write_january_file(&january).unwrap();
    common::write_february_file(&february).unwrap();

    let mut routes = HashMap::new();
    routes.insert("/archive/".to_string(), INDEX.as_bytes().to_vec());
    routes.insert(
        "/files/rating_2024-01-15.xlsx".to_string(),
        std::fs::read(&january).unwrap(),
    );
    routes.insert("/files/feb.xlsx".to_string(), std::fs::read(&february).unwrap());
    // March is listed but not served.

    Archive {
        addr: serve(routes).await,
        _fixtures: fixtures,
    }
}

fn config(addr: SocketAddr, download_dir: &TempDir) -> FetchConfig {
    FetchConfig {
        catalog_url: format!("http://{}/archive/", addr),
        download_dir: download_dir.path().to_path_buf(),
        catalog_timeout: Duration::from_secs(5),
        download_timeout: Duration::from_secs(5),
        ..FetchConfig::default()
    }
}

fn options(config: &FetchConfig, limit: Option<usize>, force: bool) -> RemoteFetchOptions {
    RemoteFetchOptions {
        download_dir: config.download_dir.clone(),
        limit,
        force,
        dry_run: false,
    }
}

#[tokio::test]
async fn test_fetch_remote_imports_oldest_first_and_survives_failures() {
    let archive = archive().await;
    let downloads = TempDir::new().unwrap();
    let config = config(archive.addr, &downloads);
    let catalog = CatalogFetcher::new(&config).unwrap();
    let downloader = FileDownloader::new(&config).unwrap();
    let store = MemoryStore::new();

    let report = fetch_remote(&store, &catalog, &downloader, &options(&config, None, false))
        .await
        .unwrap();

    let names: Vec<&str> = report.files.iter().map(|f| f.filename.as_str()).collect();
    assert_eq!(
        names,
        vec!["rating_2024-01-15.xlsx", "feb.xlsx", "rating_2024-03-01.xlsx"]
    );
    assert_eq!(report.totals.files_imported, 2);
    assert_eq!(report.totals.files_failed, 1);
    assert!(matches!(report.files[2].outcome, FileOutcome::Failed { .. }));
    assert!(downloads.path().join("feb.xlsx").exists());

    assert_eq!(store.player_count(), 8);
    assert_eq!(store.snapshot_count(), 11);

    let january = store
        .find_source_file("rating_2024-01-15.xlsx")
        .await
        .unwrap()
        .unwrap();
    assert!(january.is_applied());
    assert!(january.downloaded_at.is_some());
    assert_eq!(january.fingerprint.as_ref().map(String::len), Some(64));
}

#[tokio::test]
async fn test_fetch_remote_skips_applied_unless_forced() {
    let archive = archive().await;
    let downloads = TempDir::new().unwrap();
    let config = config(archive.addr, &downloads);
    let catalog = CatalogFetcher::new(&config).unwrap();
    let downloader = FileDownloader::new(&config).unwrap();
    let store = MemoryStore::new();

    fetch_remote(&store, &catalog, &downloader, &options(&config, None, false))
        .await
        .unwrap();

    let second = fetch_remote(&store, &catalog, &downloader, &options(&config, None, false))
        .await
        .unwrap();
    assert_eq!(second.totals.files_skipped, 2);
    assert_eq!(second.totals.stats.snapshots_created, 0);

    let forced = fetch_remote(&store, &catalog, &downloader, &options(&config, None, true))
        .await
        .unwrap();
    assert_eq!(forced.totals.files_imported, 2);
    assert_eq!(forced.totals.stats.players_created, 0);
    // Replaying January restores 103's old surname, February renames him again.
    assert_eq!(forced.totals.stats.players_updated, 2);
    assert_eq!(forced.totals.stats.snapshots_created, 0);
    assert_eq!(forced.totals.stats.snapshots_skipped, 11);
    assert_eq!(store.snapshot_count(), 11);
}

#[tokio::test]
async fn test_fetch_remote_limit_counts_processed_files() {
    let archive = archive().await;
    let downloads = TempDir::new().unwrap();
    let config = config(archive.addr, &downloads);
    let catalog = CatalogFetcher::new(&config).unwrap();
    let downloader = FileDownloader::new(&config).unwrap();
    let store = MemoryStore::new();

    let first = fetch_remote(&store, &catalog, &downloader, &options(&config, Some(1), false))
        .await
        .unwrap();
    assert_eq!(first.files.len(), 1);
    assert_eq!(first.files[0].filename, "rating_2024-01-15.xlsx");

    // January is skipped as applied and does not use up the limit.
    let second = fetch_remote(&store, &catalog, &downloader, &options(&config, Some(1), false))
        .await
        .unwrap();
    assert_eq!(second.totals.files_skipped, 1);
    assert_eq!(second.totals.files_imported, 1);
    assert_eq!(second.files[1].filename, "feb.xlsx");
}

#[tokio::test]
async fn test_fetch_remote_fails_when_catalog_is_unreachable() {
    let downloads = TempDir::new().unwrap();
    let addr: SocketAddr = "127.0.0.1:9".parse().unwrap();
    let config = config(addr, &downloads);
    let catalog = CatalogFetcher::new(&config).unwrap();
    let downloader = FileDownloader::new(&config).unwrap();
    let store = MemoryStore::new();

    let result = fetch_remote(&store, &catalog, &downloader, &options(&config, None, false)).await;

    assert!(result.is_err());
    assert_eq!(store.source_file_count(), 0);
}
