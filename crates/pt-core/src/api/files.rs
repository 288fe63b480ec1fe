//! File management endpoints
//!
//! All paths are absolute within the server's file tree (`/` is the server
//! root). `root` arguments name the directory that the listed `files` are
//! relative to, matching the panel's batch endpoints.

use bytes::Bytes;
use reqwest::Method;
use serde_json::json;

use super::client::{server_path, PanelClient};
use super::models::{Item, List, SignedUrl};
use crate::error::ApiError;
use crate::types::{FileEntry, ServerId};

impl PanelClient {
    /// List the entries of `directory`
    pub async fn list_files(
        &self,
        server: &ServerId,
        directory: &str,
    ) -> Result<Vec<FileEntry>, ApiError> {
        let list: List<FileEntry> = self
            .send_json(
                self.request(Method::GET, &server_path(server, "/files/list"))
                    .query(&[("directory", directory)]),
            )
            .await?;
        Ok(list.into_attributes())
    }

    /// Read a text file
    pub async fn read_file(&self, server: &ServerId, file: &str) -> Result<String, ApiError> {
        let response = self
            .send(
                self.request(Method::GET, &server_path(server, "/files/contents"))
                    .query(&[("file", file)]),
            )
            .await?;
        response
            .text()
            .await
            .map_err(|e| ApiError::Decode(format!("Failed to read file body: {e}")))
    }

    /// Download a file through a signed URL
    pub async fn download(&self, server: &ServerId, file: &str) -> Result<Bytes, ApiError> {
        let signed: Item<SignedUrl> = self
            .send_json(
                self.request(Method::GET, &server_path(server, "/files/download"))
                    .query(&[("file", file)]),
            )
            .await?;

        tracing::debug!("Downloading {} from signed URL", file);
        let response = self
            .send(self.get_unauthenticated(&signed.attributes.url))
            .await?;
        response
            .bytes()
            .await
            .map_err(|e| ApiError::Decode(format!("Failed to read download body: {e}")))
    }

    /// Write `contents` to `file`, creating or replacing it
    pub async fn upload(
        &self,
        server: &ServerId,
        file: &str,
        contents: impl Into<Bytes>,
    ) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, &server_path(server, "/files/write"))
                .query(&[("file", file)])
                .body(reqwest::Body::from(contents.into())),
        )
        .await?;
        Ok(())
    }

    /// Rename or move `from` to `to`, both relative to `root`
    pub async fn rename(
        &self,
        server: &ServerId,
        root: &str,
        from: &str,
        to: &str,
    ) -> Result<(), ApiError> {
        self.send(
            self.request(Method::PUT, &server_path(server, "/files/rename"))
                .json(&json!({ "root": root, "files": [{ "from": from, "to": to }] })),
        )
        .await?;
        Ok(())
    }

    /// Duplicate a file next to itself
    pub async fn copy(&self, server: &ServerId, location: &str) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, &server_path(server, "/files/copy"))
                .json(&json!({ "location": location })),
        )
        .await?;
        Ok(())
    }

    /// Delete `files` under `root`
    pub async fn delete(
        &self,
        server: &ServerId,
        root: &str,
        files: &[String],
    ) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, &server_path(server, "/files/delete"))
                .json(&json!({ "root": root, "files": files })),
        )
        .await?;
        Ok(())
    }

    /// Compress `files` under `root` into a new archive
    pub async fn compress(
        &self,
        server: &ServerId,
        root: &str,
        files: &[String],
    ) -> Result<FileEntry, ApiError> {
        let archive: Item<FileEntry> = self
            .send_json(
                self.request(Method::POST, &server_path(server, "/files/compress"))
                    .json(&json!({ "root": root, "files": files })),
            )
            .await?;
        Ok(archive.attributes)
    }

    /// Extract archive `file` into `root`
    pub async fn decompress(&self, server: &ServerId, root: &str, file: &str) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, &server_path(server, "/files/decompress"))
                .json(&json!({ "root": root, "file": file })),
        )
        .await?;
        Ok(())
    }

    /// Create directory `name` under `root`
    pub async fn create_folder(
        &self,
        server: &ServerId,
        root: &str,
        name: &str,
    ) -> Result<(), ApiError> {
        self.send(
            self.request(Method::POST, &server_path(server, "/files/create-folder"))
                .json(&json!({ "root": root, "name": name })),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelConfig;
    use std::time::Duration;
    use wiremock::matchers::{body_json, body_string, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PanelClient {
        PanelClient::new(&PanelConfig {
            url: server.uri(),
            api_key: "ptlc_test".to_string(),
            request_timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_files_passes_directory() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/client/servers/1a2b/files/list"))
            .and(query_param("directory", "/plugins"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "list",
                "data": [
                    {"object": "file_object", "attributes": {"name": "config.yml", "mode": "-rw-r--r--", "size": 120, "is_file": true, "is_symlink": false, "mimetype": "text/plain", "modified_at": "2024-01-01T00:00:00+00:00"}},
                    {"object": "file_object", "attributes": {"name": "data", "mode": "drwxr-xr-x", "size": 4096, "is_file": false, "is_symlink": false, "mimetype": "inode/directory", "modified_at": "2024-01-01T00:00:00+00:00"}}
                ]
            })))
            .mount(&server)
            .await;

        let entries = client_for(&server)
            .list_files(&ServerId::from("1a2b"), "/plugins")
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_file);
        assert!(!entries[1].is_file);
    }

    #[tokio::test]
    async fn test_rename_sends_batch_shape() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/client/servers/1a2b/files/rename"))
            .and(body_json(serde_json::json!({
                "root": "/",
                "files": [{"from": "old.txt", "to": "logs/new.txt"}]
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .rename(&ServerId::from("1a2b"), "/", "old.txt", "logs/new.txt")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_writes_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/client/servers/1a2b/files/write"))
            .and(query_param("file", "/server.properties"))
            .and(body_string("motd=hello\n"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .upload(&ServerId::from("1a2b"), "/server.properties", "motd=hello\n")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_download_follows_signed_url() {
        let server = MockServer::start().await;
        let signed = format!("{}/download/signed?token=abc", server.uri());
        Mock::given(method("GET"))
            .and(path("/api/client/servers/1a2b/files/download"))
            .and(query_param("file", "/world.zip"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "signed_url",
                "attributes": {"url": signed}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/download/signed"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3]))
            .mount(&server)
            .await;

        let bytes = client_for(&server)
            .download(&ServerId::from("1a2b"), "/world.zip")
            .await
            .unwrap();
        assert_eq!(bytes.as_ref(), &[1, 2, 3]);
    }

    #[tokio::test]
    async fn test_delete_failure_reports_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/client/servers/1a2b/files/delete"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "errors": [{"code": "NotFoundHttpException", "status": "404", "detail": "The requested resource does not exist on this server."}]
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .delete(&ServerId::from("1a2b"), "/", &["missing.txt".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_compress_returns_archive_entry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/client/servers/1a2b/files/compress"))
            .and(body_json(serde_json::json!({"root": "/", "files": ["world", "logs"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "object": "file_object",
                "attributes": {"name": "archive-2024.tar.gz", "size": 5000, "is_file": true}
            })))
            .mount(&server)
            .await;

        let archive = client_for(&server)
            .compress(
                &ServerId::from("1a2b"),
                "/",
                &["world".to_string(), "logs".to_string()],
            )
            .await
            .unwrap();
        assert_eq!(archive.name, "archive-2024.tar.gz");
    }
}
