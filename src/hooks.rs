use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Lifecycle points at which a host dispatches to its plugins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    /// Invocation is set up; user code has not run yet.
    PostSetup,
    /// Fired before the host builds its report.
    PreReport,
    /// Fired after the user handler has returned.
    PostInvoke,
}

impl Hook {
    pub fn name(&self) -> &'static str {
        match self {
            Hook::PostSetup => "post:setup",
            Hook::PreReport => "pre:report",
            Hook::PostInvoke => "post:invoke",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the host knows about the running invocation.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub start_time: DateTime<Utc>,
    /// Caller identity presented to the signer.
    pub auth_token: String,
    pub request_id: Option<String>,
}

impl InvocationContext {
    pub fn new(auth_token: impl Into<String>) -> Self {
        Self {
            start_time: Utc::now(),
            auth_token: auth_token.into(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Introspection data a plugin exposes to the host report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginMeta {
    pub name: String,
    pub version: String,
    pub homepage: Option<String>,
    pub enabled: bool,
    pub uploads: Vec<String>,
}

/// A plugin driven by the host's invocation lifecycle.
///
/// Hooks never fail from the host's point of view; a plugin must absorb its
/// own errors.
#[async_trait]
pub trait Plugin: Send {
    fn meta(&self) -> PluginMeta;

    /// Hooks this plugin wants to receive, in no particular order.
    fn hooks(&self) -> &'static [Hook];

    async fn on_hook(&mut self, hook: Hook, ctx: &InvocationContext);
}
