use serde_json::json;

use invocation_logger::config::LoggerOptions;
use invocation_logger::hooks::{InvocationContext, Plugin};
use invocation_logger::init::init_debug_tracing;
use invocation_logger::{console_debug, console_dir, console_error, console_info, console_log, console_warn, factory};

/// Drives one invocation the way a host would: setup hook, user code,
/// terminal hook. Set `INVOCATION_LOGGER_SIGNER_URL` to exercise the upload
/// path, or `INVOCATION_LOGGER_OUTPUT` to persist the captured log locally.
#[tokio::main]
async fn main() {
    init_debug_tracing();

    let make = factory(LoggerOptions {
        enabled: Some(true),
        ..Default::default()
    });
    let mut plugin = make();
    let ctx = InvocationContext::new("demo-token").with_request_id("demo-request");

    for hook in plugin.hooks() {
        if *hook == invocation_logger::hooks::Hook::PostSetup {
            plugin.on_hook(*hook, &ctx).await;
        }
    }

    console_log!("log-string-test", 72);
    console_debug!("debug-string-test", 72);
    console_info!("%s finished in %dms", "handler", 12);
    console_warn!("warn-string-test", json!({ "showHidden": true }));
    console_error!("error-string-test", 72);
    console_dir!(json!({ "nested": [1, 2, 3] }));

    for hook in plugin.hooks() {
        if *hook != invocation_logger::hooks::Hook::PostSetup {
            plugin.on_hook(*hook, &ctx).await;
        }
    }

    println!("state: {:?}", plugin.state());
    println!("meta: {}", serde_json::to_string(&plugin.meta()).unwrap_or_default());
    for record in plugin.logs() {
        println!("captured: {}", serde_json::to_string(record).unwrap_or_default());
    }
}
