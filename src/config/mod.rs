//! Configuration for model-config
//!
//! - config directory resolution (`MODEL_CONFIG_DIR`, XDG, home)
//! - settings from `config.json` overlaid with environment variables

pub mod paths;
pub mod settings;

pub use paths::ConfigPaths;
pub use settings::{Settings, SheetNames, StoreBackend, DEFAULT_PORT};
