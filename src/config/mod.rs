//! Config module (modularized).
//! Provides configuration types, default paths, XML loading, and validation.

pub mod paths;
pub mod types;
mod validate;
pub mod xml;

pub use paths::{default_config_path, default_data_dir, default_log_path, path_has_symlink_ancestor};
pub use types::{Config, LogLevel, RootConfig};
pub use xml::{
    create_template_config, ensure_default_config_exists, load_config_from_default_xml,
    load_config_from_xml_env, load_config_from_xml_path,
};

/// Environment variable naming an explicit config file (or directory).
pub const CONFIG_ENV: &str = "SAFE_PERSIST_CONFIG";

/// Root names used when no config provides any.
pub const CARD_ROOT_NAME: &str = "SDCard";
pub const DEVICE_MEMORY_ROOT_NAME: &str = "store";
