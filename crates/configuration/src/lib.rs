use std::path::Path;
use tracing::debug;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{Chart, Engine, Input, Output, Settings};

/// Loads the application configuration.
///
/// With an explicit `path` the file must exist and parse; without one, a
/// `tearsheet.toml` in the working directory is used when present and the
/// built-in defaults otherwise.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let builder = match path {
        Some(p) => config::Config::builder()
            .add_source(config::File::from(p).required(true)),
        None => config::Config::builder()
            .add_source(config::File::with_name("tearsheet").required(false)),
    };

    let settings = builder.build()?.try_deserialize::<Settings>()?;
    debug!(?settings, "configuration loaded");
    Ok(settings)
}
