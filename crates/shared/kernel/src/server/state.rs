use axum::extract::FromRef;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;
use svcd_database::Database;
use svcd_domain::config::ApiConfig;
use svcd_domain::registry::DomainRegistry;

#[svcd_derive::svcd_error]
pub enum ApiStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct ApiStateInner {
    pub config: ApiConfig,
    pub database: Database,
    pub registry: Arc<DomainRegistry>,
}

/// Router state; cloned per request.
#[derive(Debug, Clone)]
pub struct ApiState {
    inner: Arc<ApiStateInner>,
}

impl ApiState {
    #[must_use]
    pub fn builder() -> ApiStateBuilder {
        ApiStateBuilder::default()
    }
}

impl Deref for ApiState {
    type Target = ApiStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FromRef<ApiState> for ApiConfig {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.config.clone()
    }
}

impl FromRef<ApiState> for Database {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.database.clone()
    }
}

impl FromRef<ApiState> for Arc<DomainRegistry> {
    fn from_ref(state: &ApiState) -> Self {
        state.inner.registry.clone()
    }
}

#[derive(Debug, Default)]
pub struct ApiStateBuilder {
    config: Option<ApiConfig>,
    database: Option<Database>,
    registry: Option<DomainRegistry>,
}

impl ApiStateBuilder {
    #[must_use]
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn db(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// Overrides the registry; otherwise it is built from `config.domains`.
    #[must_use]
    pub fn registry(mut self, registry: DomainRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// # Errors
    /// Returns [`ApiStateError::Validation`] when the database is missing or the configured
    /// domains do not form a valid registry.
    pub fn build(self) -> Result<ApiState, ApiStateError> {
        let config = self.config.unwrap_or_default();
        let database = self.database.ok_or_else(|| ApiStateError::Validation {
            message: "Database not provided".into(),
            context: None,
        })?;
        let registry = match self.registry {
            Some(registry) => registry,
            None => DomainRegistry::from_config(&config.domains).map_err(|e| {
                ApiStateError::Validation {
                    message: e.to_string().into(),
                    context: Some("Building domain registry".into()),
                }
            })?,
        };

        Ok(ApiState {
            inner: Arc::new(ApiStateInner { config, database, registry: Arc::new(registry) }),
        })
    }
}
