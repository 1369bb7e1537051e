//! Catalog acquisition: copy a local override or download the published dump.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use log::{debug, info, warn};
use reqwest::Client;
use tokio::io::AsyncWriteExt;

use crate::config::DataSource;
use crate::error::{BotError, Result};

/// Place a fresh catalog at `working_path`.
///
/// The file is written next to the target and renamed over it, so a reader
/// never sees a half-written catalog.
///
/// # Errors
///
/// Returns an error if the copy or download fails.
pub async fn fetch_catalog(
    client: &Client,
    source: &DataSource,
    working_path: &Path,
) -> Result<()> {
    if let Some(parent) = working_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let staging = staging_path(working_path);

    if let Err(e) = write_staging(client, source, &staging).await {
        if let Err(cleanup) = tokio::fs::remove_file(&staging).await
            && cleanup.kind() != std::io::ErrorKind::NotFound
        {
            warn!("Failed to remove {}: {cleanup}", staging.display());
        }
        return Err(e);
    }

    tokio::fs::rename(&staging, working_path).await?;
    Ok(())
}

async fn write_staging(client: &Client, source: &DataSource, staging: &Path) -> Result<()> {
    match source {
        DataSource::File(path) => {
            info!("Copying catalog override from {}", path.display());
            tokio::fs::copy(path, staging).await?;
        }
        DataSource::Remote(url) => {
            info!("Downloading catalog from {url}");
            let response = client.get(url.clone()).send().await?;
            if !response.status().is_success() {
                return Err(BotError::CatalogDownload {
                    status: response.status(),
                    url: url.to_string(),
                });
            }

            let mut file = tokio::fs::File::create(staging).await?;
            let mut stream = response.bytes_stream();
            let mut written = 0usize;
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                written += chunk.len();
                file.write_all(&chunk).await?;
            }
            file.flush().await?;
            debug!("Downloaded {written} bytes");
        }
    }
    Ok(())
}

fn staging_path(working_path: &Path) -> PathBuf {
    let mut name = working_path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".partial");
    working_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::*;

    #[tokio::test]
    async fn copies_local_override_into_working_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = dir.path().join("override.sqlite");
        tokio::fs::write(&source, b"catalog bytes")
            .await
            .expect("write source");
        let working = dir.path().join("work").join("catalog.sqlite");

        fetch_catalog(&Client::new(), &DataSource::File(source), &working)
            .await
            .expect("copy succeeds");

        let copied = tokio::fs::read(&working).await.expect("read copy");
        assert_eq!(copied, b"catalog bytes");
        assert!(!staging_path(&working).exists());
    }

    #[tokio::test]
    async fn missing_override_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = fetch_catalog(
            &Client::new(),
            &DataSource::File(dir.path().join("nope.sqlite")),
            &dir.path().join("catalog.sqlite"),
        )
        .await;
        assert!(matches!(result, Err(BotError::Io(_))));
    }

    #[tokio::test]
    async fn interrupted_download_leaves_no_partial_file() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            // Promise more bytes than are sent, then hang up.
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\ntruncated")
                .await;
        });

        let dir = tempfile::tempdir().expect("tempdir");
        let working = dir.path().join("catalog.sqlite");
        let url = url::Url::parse(&format!("http://{addr}/catalog.sqlite")).expect("url");
        let result = fetch_catalog(&Client::new(), &DataSource::Remote(url), &working).await;
        server.await.expect("server task");

        assert!(result.is_err());
        assert!(!staging_path(&working).exists());
        assert!(!working.exists());
    }

    #[tokio::test]
    async fn failed_copy_clears_stale_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let working = dir.path().join("catalog.sqlite");
        tokio::fs::write(staging_path(&working), b"stale")
            .await
            .expect("write stale staging");

        let result = fetch_catalog(
            &Client::new(),
            &DataSource::File(dir.path().join("nope.sqlite")),
            &working,
        )
        .await;

        assert!(result.is_err());
        assert!(!staging_path(&working).exists());
    }

    #[test]
    fn staging_sits_next_to_target() {
        let staging = staging_path(Path::new("data/catalog.sqlite"));
        assert_eq!(staging, PathBuf::from("data/catalog.sqlite.partial"));
    }
}
