use crate::config::{LoggerConfig, LoggerOptions};
use crate::error::CaptureError;
use crate::hooks::{Hook, InvocationContext, Plugin, PluginMeta};
use crate::interceptor::{Interceptor, ShimGuard};
use crate::record::Record;
use crate::upload::{ndjson_body, Signer, SignerRequest, UploadCredential, Uploader, LOG_EXTENSION};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

/// Hooks registered by the local variant.
const LOCAL_HOOKS: &[Hook] = &[Hook::PostSetup, Hook::PreReport];
/// Hooks registered when uploading.
const UPLOAD_HOOKS: &[Hook] = &[Hook::PostSetup, Hook::PostInvoke];

/// Where a [`LoggerPlugin`] is in its single-invocation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// Shims installed, credential request (if any) in flight.
    Armed,
    /// Terminal hook running: shims removed, records aggregated.
    Finalizing,
    Uploaded,
    /// Nothing was captured; no upload attempted.
    NoOpEmpty,
    /// Records captured but not uploaded, either because no signer is
    /// configured or because the signer granted no signed URL.
    UploadSkipped,
    /// Signer or upload failed. Captured records are still intact.
    UploadFailed,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Uploaded
                | PipelineState::NoOpEmpty
                | PipelineState::UploadSkipped
                | PipelineState::UploadFailed
        )
    }
}

#[derive(Clone)]
struct UploadTarget {
    signer: Arc<dyn Signer>,
    uploader: Arc<dyn Uploader>,
}

type PendingCredential = JoinHandle<Result<UploadCredential, CaptureError>>;

/// Captures console output of one invocation and, when a signer is
/// configured, uploads it as newline-delimited JSON before the invocation is
/// reported complete.
///
/// Create one instance per invocation; nothing carries over between
/// instances. Failures are logged on the `tracing` debug channel and never
/// propagated to the host.
pub struct LoggerPlugin {
    config: LoggerConfig,
    interceptor: Interceptor,
    upload: Option<UploadTarget>,
    state: PipelineState,
    shims: Option<ShimGuard>,
    credential: Option<PendingCredential>,
    logs: Vec<Record>,
    uploads: Vec<String>,
}

impl LoggerPlugin {
    /// Local variant: capture only.
    ///
    /// No file is written unless `config.output_path` is set; then the
    /// aggregated log is persisted there as a JSON array by [`Self::pre_report`].
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            interceptor: Interceptor::new(config.timestamp_mode),
            config,
            upload: None,
            state: PipelineState::Idle,
            shims: None,
            credential: None,
            logs: Vec::new(),
            uploads: Vec::new(),
        }
    }

    /// Upload variant with explicit signer and uploader.
    pub fn with_upload(config: LoggerConfig, signer: Arc<dyn Signer>, uploader: Arc<dyn Uploader>) -> Self {
        let mut plugin = Self::new(config);
        plugin.upload = Some(UploadTarget { signer, uploader });
        plugin
    }

    /// Pick the variant from the configuration: an HTTP signer and uploader
    /// when `signer_url` is set, the local variant otherwise.
    #[cfg(feature = "upload")]
    pub fn from_config(config: LoggerConfig) -> Self {
        use crate::http::{HttpSigner, HttpUploader};

        match config.signer_url.clone() {
            Some(url) => {
                let client = reqwest::Client::new();
                let signer = Arc::new(HttpSigner::with_client(client.clone(), url));
                let uploader = Arc::new(HttpUploader::with_client(client));
                Self::with_upload(config, signer, uploader)
            }
            None => Self::new(config),
        }
    }

    #[cfg(not(feature = "upload"))]
    pub fn from_config(config: LoggerConfig) -> Self {
        if config.signer_url.is_some() {
            debug!("upload feature is disabled; signer url ignored");
        }
        Self::new(config)
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Aggregated log. Empty until the terminal hook has run.
    pub fn logs(&self) -> &[Record] {
        &self.logs
    }

    /// Access tokens of completed uploads.
    pub fn uploads(&self) -> &[String] {
        &self.uploads
    }

    /// Install the console shims and, when uploading, start the credential
    /// request without waiting for it.
    ///
    /// The request is spawned on the current Tokio runtime. Without one the
    /// shims are still installed and the invocation ends without an upload.
    pub fn post_setup(&mut self, ctx: &InvocationContext) {
        if !self.config.enabled || self.state != PipelineState::Idle {
            return;
        }

        if let Some(target) = &self.upload {
            match Handle::try_current() {
                Ok(runtime) => {
                    let signer = Arc::clone(&target.signer);
                    let request = SignerRequest {
                        timestamp: ctx.start_time.timestamp_millis(),
                        auth_token: ctx.auth_token.clone(),
                        extension: LOG_EXTENSION.to_string(),
                        request_id: ctx.request_id.clone(),
                    };
                    debug!(request_id = ?request.request_id, "requesting upload credential");
                    self.credential =
                        Some(runtime.spawn(async move { signer.request_credential(&request).await }));
                }
                Err(e) => {
                    debug!(error = %e, "no tokio runtime; capturing without upload credential");
                }
            }
        }

        self.shims = Some(self.interceptor.install());
        self.state = PipelineState::Armed;
    }

    /// Terminal hook of the local variant.
    pub fn pre_report(&mut self) -> PipelineState {
        if self.state != PipelineState::Armed {
            return self.state;
        }
        self.finalize();

        if let Some(path) = self.config.output_path.clone() {
            if let Err(e) = write_artifact(&path, &self.logs) {
                debug!(path = %path.display(), error = %e, "failed to persist captured logs");
            }
        }

        self.state = if self.logs.is_empty() {
            PipelineState::NoOpEmpty
        } else {
            PipelineState::UploadSkipped
        };
        debug!(state = ?self.state, records = self.logs.len(), "capture finished");
        self.state
    }

    /// Terminal hook of the upload variant. Completes only once the upload
    /// (if any) has finished.
    pub async fn post_invoke(&mut self) -> PipelineState {
        if self.state != PipelineState::Armed {
            return self.state;
        }
        self.finalize();

        self.state = if self.logs.is_empty() {
            // The credential task keeps running detached; nothing will use it.
            self.credential = None;
            PipelineState::NoOpEmpty
        } else {
            match (self.upload.as_ref(), self.credential.take()) {
                (Some(target), Some(pending)) => match ship(target, &self.logs, pending).await {
                    Ok(credential) => {
                        debug!(url = ?credential.public_url, "captured logs uploaded");
                        if let Some(token) = credential.access_token {
                            self.uploads.push(token);
                        }
                        PipelineState::Uploaded
                    }
                    Err(CaptureError::MissingCredential) => {
                        debug!("signer granted no upload url; skipping upload");
                        PipelineState::UploadSkipped
                    }
                    Err(e) => {
                        debug!(error = %e, "log upload failed");
                        PipelineState::UploadFailed
                    }
                },
                _ => PipelineState::UploadSkipped,
            }
        };
        debug!(state = ?self.state, records = self.logs.len(), "capture finished");
        self.state
    }

    fn finalize(&mut self) {
        self.state = PipelineState::Finalizing;
        let logs = self.shims.take().map(ShimGuard::uninstall).unwrap_or_default();
        self.logs = logs.into_aggregated();
    }
}

/// Await the credential, then PUT the records to the signed URL.
async fn ship(
    target: &UploadTarget,
    logs: &[Record],
    pending: PendingCredential,
) -> Result<UploadCredential, CaptureError> {
    let credential = pending.await.map_err(|e| CaptureError::Join(e.to_string()))??;
    let url = credential.upload_url().ok_or(CaptureError::MissingCredential)?;
    let body = ndjson_body(logs)?;
    target.uploader.put(url, body).await?;
    Ok(credential)
}

fn write_artifact(path: &Path, logs: &[Record]) -> Result<(), CaptureError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    serde_json::to_writer(std::io::BufWriter::new(file), logs)?;
    Ok(())
}

#[async_trait]
impl Plugin for LoggerPlugin {
    fn meta(&self) -> PluginMeta {
        PluginMeta {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            homepage: option_env!("CARGO_PKG_HOMEPAGE")
                .filter(|h| !h.is_empty())
                .map(str::to_string),
            enabled: self.config.enabled,
            uploads: self.uploads.clone(),
        }
    }

    fn hooks(&self) -> &'static [Hook] {
        if self.upload.is_some() {
            UPLOAD_HOOKS
        } else {
            LOCAL_HOOKS
        }
    }

    async fn on_hook(&mut self, hook: Hook, ctx: &InvocationContext) {
        if !self.hooks().contains(&hook) {
            return;
        }
        match hook {
            Hook::PostSetup => self.post_setup(ctx),
            Hook::PreReport => {
                self.pre_report();
            }
            Hook::PostInvoke => {
                self.post_invoke().await;
            }
        }
    }
}

/// Build a fresh [`LoggerPlugin`] per invocation, resolving the configuration
/// against the environment each time.
pub fn factory(options: LoggerOptions) -> impl Fn() -> LoggerPlugin + Send + Sync {
    move || LoggerPlugin::from_config(LoggerConfig::resolve(options.clone()))
}
