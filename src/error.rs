/// Failures inside the capture pipeline.
///
/// None of these ever reach the host: the terminal hook logs them on the
/// debug channel and degrades to "no upload".
#[derive(thiserror::Error, Debug)]
pub enum CaptureError {
    #[cfg(feature = "upload")]
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("signer responded with status {0}")]
    SignerStatus(u16),

    #[error("upload responded with status {0}")]
    UploadStatus(u16),

    #[error("signer response carried no signed upload url")]
    MissingCredential,

    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write log artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential request task failed: {0}")]
    Join(String),
}
