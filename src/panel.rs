use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::PanelConfig,
    error::{ActionError, Result},
    remote::FileRemote,
    types::{DirectoryListing, FileEntity, RenamePair},
};

/// Panel-backed file remote
///
/// Talks to the client API under `/api/client/servers/{server}/files/`
/// using a bearer API key.
#[derive(Clone)]
pub struct PanelClient {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ListResponse {
    data: Vec<FileObjectWrapper>,
}

#[derive(Deserialize)]
struct FileObjectWrapper {
    attributes: FileObjectAttributes,
}

#[derive(Deserialize)]
struct FileObjectAttributes {
    name: String,
    #[serde(default)]
    mode: String,
    #[serde(default)]
    mode_bits: String,
    #[serde(default)]
    size: u64,
    is_file: bool,
    #[serde(default)]
    is_symlink: bool,
    #[serde(default)]
    mimetype: String,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    attributes: SignedUrlAttributes,
}

#[derive(Deserialize)]
struct SignedUrlAttributes {
    url: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    errors: Vec<ErrorDetail>,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: String,
}

#[derive(Serialize)]
struct RootedFiles<'a> {
    root: &'a str,
    files: &'a [String],
}

#[derive(Serialize)]
struct CopyRequest<'a> {
    location: &'a str,
}

#[derive(Serialize)]
struct DecompressRequest<'a> {
    root: &'a str,
    file: &'a str,
}

#[derive(Serialize)]
struct RenameRequest<'a> {
    root: &'a str,
    files: &'a [RenamePair],
}

#[derive(Serialize)]
struct ChmodEntry<'a> {
    file: &'a str,
    mode: &'a str,
}

#[derive(Serialize)]
struct ChmodRequest<'a> {
    root: &'a str,
    files: [ChmodEntry<'a>; 1],
}

impl From<FileObjectAttributes> for FileEntity {
    fn from(a: FileObjectAttributes) -> Self {
        FileEntity {
            key: FileEntity::key_for(&a.name, a.is_file),
            name: a.name,
            mode: a.mode,
            mode_bits: a.mode_bits,
            size: a.size,
            is_file: a.is_file,
            is_symlink: a.is_symlink,
            mimetype: a.mimetype,
        }
    }
}

impl PanelClient {
    /// Create a client from validated settings
    pub fn new(config: &PanelConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build the URL of a file endpoint
    fn files_url(&self, server_id: &str, endpoint: &str) -> String {
        format!(
            "{}/api/client/servers/{}/files/{}",
            self.base_url, server_id, endpoint
        )
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
    }

    /// Turn a non-success response into a rejection carrying the panel's message
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.errors.into_iter().next())
            .map(|e| e.detail)
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| Self::fallback_message(status, &body));

        Err(ActionError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    fn fallback_message(status: StatusCode, body: &str) -> String {
        if body.is_empty() {
            format!("Unexpected status {}", status)
        } else {
            format!("Unexpected status {}: {}", status, body)
        }
    }

    async fn post_json<T: Serialize + Sync>(
        &self,
        server_id: &str,
        endpoint: &str,
        body: &T,
    ) -> Result<()> {
        let url = self.files_url(server_id, endpoint);
        debug!(%url, "POST");
        let response = self
            .authorized(self.client.post(&url))
            .json(body)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl FileRemote for PanelClient {
    async fn list_directory(&self, server_id: &str, directory: &str) -> Result<DirectoryListing> {
        let url = self.files_url(server_id, "list");
        let response = self
            .authorized(self.client.get(&url))
            .query(&[("directory", directory)])
            .send()
            .await?;
        let listing: ListResponse = Self::check(response).await?.json().await?;

        Ok(DirectoryListing {
            directory: directory.to_string(),
            entries: listing
                .data
                .into_iter()
                .map(|o| FileEntity::from(o.attributes))
                .collect(),
        })
    }

    async fn delete(&self, server_id: &str, directory: &str, names: &[String]) -> Result<()> {
        self.post_json(server_id, "delete", &RootedFiles { root: directory, files: names })
            .await
    }

    async fn copy(&self, server_id: &str, full_path: &str) -> Result<()> {
        self.post_json(server_id, "copy", &CopyRequest { location: full_path })
            .await
    }

    async fn download_url(&self, server_id: &str, full_path: &str) -> Result<String> {
        let url = self.files_url(server_id, "download");
        let response = self
            .authorized(self.client.get(&url))
            .query(&[("file", full_path)])
            .send()
            .await?;
        let signed: SignedUrlResponse = Self::check(response).await?.json().await?;
        Ok(signed.attributes.url)
    }

    async fn compress(&self, server_id: &str, directory: &str, names: &[String]) -> Result<()> {
        self.post_json(server_id, "compress", &RootedFiles { root: directory, files: names })
            .await
    }

    async fn decompress(&self, server_id: &str, directory: &str, name: &str) -> Result<()> {
        self.post_json(server_id, "decompress", &DecompressRequest { root: directory, file: name })
            .await
    }

    async fn rename(&self, server_id: &str, directory: &str, pairs: &[RenamePair]) -> Result<()> {
        let url = self.files_url(server_id, "rename");
        debug!(%url, "PUT");
        let response = self
            .authorized(self.client.put(&url))
            .json(&RenameRequest { root: directory, files: pairs })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn chmod(&self, server_id: &str, directory: &str, name: &str, mode: &str) -> Result<()> {
        let body = ChmodRequest {
            root: directory,
            files: [ChmodEntry { file: name, mode }],
        };
        self.post_json(server_id, "chmod", &body).await
    }

    fn identifier(&self) -> String {
        format!("panel://{}", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> PanelClient {
        PanelClient::new(&PanelConfig::new(base, "ptlc_test")).unwrap()
    }

    #[test]
    fn test_files_url() {
        let panel = client("https://panel.test/");
        assert_eq!(
            panel.files_url("1a2b3c", "delete"),
            "https://panel.test/api/client/servers/1a2b3c/files/delete"
        );
        assert_eq!(panel.identifier(), "panel://https://panel.test");
    }

    #[test]
    fn test_rejects_invalid_config() {
        assert!(PanelClient::new(&PanelConfig::new("ftp://panel.test", "k")).is_err());
    }

    #[test]
    fn test_file_object_conversion() {
        let raw = r#"{"name": "world", "mode": "drwxr-xr-x", "mode_bits": "755", "size": 4096,
                      "is_file": false, "is_symlink": false, "mimetype": "inode/directory"}"#;
        let attrs: FileObjectAttributes = serde_json::from_str(raw).unwrap();
        let entity = FileEntity::from(attrs);
        assert_eq!(entity.key, "dir_world");
        assert_eq!(entity.mode_bits, "755");
        assert!(entity.is_directory());
    }
}
