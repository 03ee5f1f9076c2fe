use config::{Config, Environment, File, Map};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

const DEFAULT_CONFIG_FILE: &str = "server";
const ENV_PREFIX: &str = "SVCD";
const ENV_SEPARATOR: &str = "__";

#[svcd_derive::svcd_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads layered configuration.
///
/// 1. **Base file**: `path` (extension optional, any format the `config` crate knows),
///    defaulting to `server` in the working directory. A missing file is not an error;
///    every section has defaults.
/// 2. **Environment**: variables prefixed with `SVCD__`, nested with `__`
///    (`SVCD__DATABASE__URL` sets `database.url`).
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is malformed or a value does not fit `T`.
///
/// # Example
/// ```rust
/// use svcd_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     #[serde(default)]
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, None)
}

/// Same as [`load_config`], reading overrides from `vars` instead of the process environment.
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is malformed or a value does not fit `T`.
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    vars: Map<String, String>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_layered(path, Some(vars))
}

fn load_layered<T>(
    path: Option<impl AsRef<Path>>,
    vars: Option<Map<String, String>>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());

    info!(path = %path.display(), "Loading configuration");

    Config::builder()
        .add_source(File::from(path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true)
                .source(vars),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
