use crate::error::CaptureError;
use crate::upload::{Signer, SignerRequest, UploadCredential, Uploader};
use async_trait::async_trait;
use reqwest::Client;

/// Signer reached over HTTP.
///
/// The credential request is POSTed as JSON to `url`; a successful response
/// carries `{jwtAccess, signedRequest, url}`.
#[derive(Clone, Debug)]
pub struct HttpSigner {
    client: Client,
    url: String,
}

impl HttpSigner {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Share an existing client, e.g. with the [`HttpUploader`].
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Signer for HttpSigner {
    async fn request_credential(&self, request: &SignerRequest) -> Result<UploadCredential, CaptureError> {
        let resp = self.client.post(&self.url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CaptureError::SignerStatus(status.as_u16()));
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Uploads payloads with a plain PUT to the signed URL.
#[derive(Clone, Debug, Default)]
pub struct HttpUploader {
    client: Client,
}

impl HttpUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Uploader for HttpUploader {
    async fn put(&self, url: &str, body: String) -> Result<(), CaptureError> {
        let resp = self.client.put(url).body(body).send().await?;
        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(CaptureError::UploadStatus(status.as_u16()));
        }
        Ok(())
    }
}
