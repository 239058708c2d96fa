pub mod algo;
pub mod error;
pub mod ops;

#[cfg(feature = "mcp")]
pub mod mcp;

#[cfg(feature = "plugin")]
pub mod commands;

pub use error::{AgronomyError, Result};

#[cfg(feature = "plugin")]
use nu_plugin::{Plugin, PluginCommand};

#[cfg(feature = "plugin")]
pub struct AgronomyPlugin;

#[cfg(feature = "plugin")]
impl Plugin for AgronomyPlugin {
    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").into()
    }

    fn commands(&self) -> Vec<Box<dyn PluginCommand<Plugin = Self>>> {
        vec![
            Box::new(commands::Crop),
            Box::new(commands::Fertilizer),
            Box::new(commands::Soil),
            Box::new(commands::Price),
            Box::new(commands::Classify),
            Box::new(commands::WeatherCode),
        ]
    }
}

/// Install a stderr `tracing` subscriber filtered by `AGRONOMY_LOG`
/// (falling back to `RUST_LOG`, then `warn`).
#[cfg(any(feature = "cli", feature = "plugin"))]
pub fn init_logging() {
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    let filter = std::env::var("AGRONOMY_LOG")
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
