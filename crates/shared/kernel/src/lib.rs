//! Kernel pieces shared by the gateway's feature crates and the server binary.
//!
//! * [`config::load_config`] layers a TOML file with `SVCD__` environment overrides.
//! * [`server::ApiState`] is the router state: configuration, database handle and the
//!   immutable domain registry.
//! * [`server::ErrorBody`] is the `{ statusCode, error, message }` body every failure uses.
//! * [`security::ObjectIdGuard`] turns path identifiers into `ObjectId`s.
//!
//! ## Config loading
//! ```rust,no_run
//! use svcd_kernel::config::load_config;
//! use svcd_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap();
//! assert_eq!(cfg.server.port, 8000);
//! ```

pub mod config;
pub mod prelude;
pub mod security;
pub mod server;

pub use svcd_database as database;
pub use svcd_domain as domain;
