pub mod record;
pub mod format;
pub mod console;
pub mod sink;
pub mod interceptor;

pub mod config;
pub mod env;
pub mod error;
pub mod hooks;
pub mod upload;

#[cfg(feature = "upload")]
pub mod http;

pub mod plugin;
pub mod init;

pub use plugin::{factory, LoggerPlugin, PipelineState};
