//! Google Drive v3 implementation of `RemoteStore`.
//!
//! Documents live in the application-private `appDataFolder` space, so the
//! narrow `drive.appdata` scope is enough. Creation uses a multipart/related
//! upload (metadata part + content part); updates use a simple media upload
//! against the known file id.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::AuthProvider;
use crate::error::RemoteError;
use crate::types::DocumentHandle;

use super::types::RemoteStore;

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";
const MULTIPART_BOUNDARY: &str = "-------314159265358979323846";

pub struct DriveStore {
    client: Client,
    auth: Arc<dyn AuthProvider>,
    api_base: String,
    upload_base: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Deserialize)]
struct FileRef {
    id: Option<String>,
}

impl DriveStore {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self::with_base_urls(auth, API_BASE, UPLOAD_BASE)
    }

    /// Point the client at different API hosts (tests, proxies).
    pub fn with_base_urls(auth: Arc<dyn AuthProvider>, api_base: &str, upload_base: &str) -> Self {
        Self {
            client: Client::new(),
            auth,
            api_base: api_base.trim_end_matches('/').to_string(),
            upload_base: upload_base.trim_end_matches('/').to_string(),
        }
    }

    fn token(&self) -> Result<String, RemoteError> {
        self.auth.bearer_token().ok_or(RemoteError::NotSignedIn)
    }
}

#[async_trait]
impl RemoteStore for DriveStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<DocumentHandle>, RemoteError> {
        let token = self.token()?;
        let q = format!("name='{name}' and 'appDataFolder' in parents");
        let list: FileList = self
            .client
            .get(format!("{}/files", self.api_base))
            .bearer_auth(token)
            .query(&[
                ("q", q.as_str()),
                ("spaces", "appDataFolder"),
                ("fields", "files(id,name)"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(list
            .files
            .into_iter()
            .next()
            .and_then(|f| f.id)
            .map(DocumentHandle::new))
    }

    async fn download(&self, handle: &DocumentHandle) -> Result<Vec<u8>, RemoteError> {
        let token = self.token()?;
        let bytes = self
            .client
            .get(format!("{}/files/{}", self.api_base, handle.as_str()))
            .bearer_auth(token)
            .query(&[("alt", "media")])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }

    async fn create(
        &self,
        name: &str,
        parent_folder: &str,
        content: &[u8],
    ) -> Result<DocumentHandle, RemoteError> {
        let token = self.token()?;
        let metadata = serde_json::json!({ "name": name, "parents": [parent_folder] });

        let mut body = Vec::new();
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
        body.extend_from_slice(metadata.to_string().as_bytes());
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(b"Content-Type: application/json\r\n\r\n");
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--").as_bytes());

        let created: FileRef = self
            .client
            .post(format!(
                "{}/files?uploadType=multipart&fields=id",
                self.upload_base
            ))
            .bearer_auth(token)
            .header(
                "Content-Type",
                format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        created
            .id
            .map(DocumentHandle::new)
            .ok_or(RemoteError::MissingDocumentId)
    }

    async fn update(&self, handle: &DocumentHandle, content: &[u8]) -> Result<(), RemoteError> {
        let token = self.token()?;
        self.client
            .patch(format!(
                "{}/files/{}?uploadType=media",
                self.upload_base,
                handle.as_str()
            ))
            .bearer_auth(token)
            .header("Content-Type", "application/json")
            .body(content.to_vec())
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
