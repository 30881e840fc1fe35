use tracing::Level;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

/// Настройка внутреннего отладочного канала.
///
/// Ошибки подписи и загрузки никогда не возвращаются хосту, они только
/// пишутся через `tracing::debug!`. Этот конфиг позволяет увидеть их.
///
/// **Поля**
/// - `level`: максимальный уровень событий, попадающих в вывод.
/// - `ansi`: раскрашивать ли вывод.
#[derive(Clone, Debug)]
pub struct DebugConfig {
    pub level: Level,
    pub ansi: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            ansi: false,
        }
    }
}

/// Install a global subscriber that prints this crate's diagnostics to
/// stderr.
///
/// **Behavior**
///
/// Diagnostics go straight to stderr through a `fmt` layer and never pass
/// through the intercepted console surface, so they are not captured as
/// records. If a global subscriber is already set this is a no-op and
/// returns `false`.
pub fn init_debug_tracing_with_config(config: DebugConfig) -> bool {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_filter(tracing_subscriber::filter::LevelFilter::from_level(config.level));
    Registry::default().with(fmt_layer).try_init().is_ok()
}

/// [`init_debug_tracing_with_config`] with [`DebugConfig::default`].
pub fn init_debug_tracing() -> bool {
    init_debug_tracing_with_config(DebugConfig::default())
}
