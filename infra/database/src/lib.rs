//! # Database Infrastructure
//!
//! A single handle over the document store used by the gateway.
//!
//! ## Engines
//! - **MongoDB** (`mongodb://`, `mongodb+srv://`): the official driver; connectivity is
//!   checked with `ping` and retried with exponential backoff during [`DatabaseBuilder::init`].
//! - **In-process** (`mem://`): documents kept per collection in insertion order. It
//!   interprets the subset of filters, projections and update operators the gateway emits.
//!
//! Both engines expose the same [`Collection`] contract: `insert_one`, `find_one`, `find`,
//! `update_one` and `replace_one`.
//!
//! ## Example
//!
//! ```rust
//! use svcd_database::bson::doc;
//! use svcd_database::{Database, DatabaseError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), DatabaseError> {
//!     let db = Database::builder().url("mem://").name("demo").init().await?;
//!
//!     let records = db.collection("records");
//!     let inserted = records.insert_one(doc! { "status": "open" }).await?;
//!     let found = records.find_one(doc! { "_id": inserted.inserted_id }, None).await?;
//!     assert!(found.is_some());
//!     Ok(())
//! }
//! ```

mod error;
mod memory;

pub use error::{DatabaseError, DatabaseErrorExt};
pub use mongodb::bson;

use crate::memory::{MemoryCollection, MemoryEngine};
use mongodb::bson::{Bson, Document, doc};
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const MEMORY_SCHEME: &str = "mem://";
const MONGODB_SCHEMES: [&str; 2] = ["mongodb://", "mongodb+srv://"];
const DEFAULT_CONNECT_RETRIES: u32 = 3;

/// Outcome of an `insert_one`.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    pub inserted_id: Bson,
    pub inserted_count: u64,
}

/// Outcome of an `update_one` or `replace_one`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

#[derive(Debug)]
enum Engine {
    Mongo(mongodb::Database),
    Memory(Arc<MemoryEngine>),
}

/// Inner state of the [`Database`] wrapper.
#[derive(Debug)]
pub struct DatabaseInner {
    engine: Engine,
    name: String,
}

impl DatabaseInner {
    /// Logical database name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `"mongodb"` or `"memory"`.
    #[must_use]
    pub const fn engine_kind(&self) -> &'static str {
        match self.engine {
            Engine::Mongo(_) => "mongodb",
            Engine::Memory(_) => "memory",
        }
    }
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        info!(database = %self.name, engine = self.engine_kind(), "Database handle dropped");
    }
}

/// Cheaply clonable handle shared by all requests.
#[derive(Debug, Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Creates a new [`DatabaseBuilder`].
    pub fn builder() -> DatabaseBuilder {
        DatabaseBuilder::default()
    }

    /// Returns a handle to the named collection. Collections are created lazily.
    #[must_use]
    pub fn collection(&self, name: &str) -> Collection {
        let backend = match &self.inner.engine {
            Engine::Mongo(db) => Backend::Mongo(db.collection::<Document>(name)),
            Engine::Memory(engine) => Backend::Memory(MemoryCollection::new(engine.clone(), name)),
        };
        Collection { name: name.to_owned(), backend }
    }

    /// Round-trips to the store.
    ///
    /// # Errors
    /// Returns [`DatabaseError::Driver`] if the server does not answer the `ping` command.
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        match &self.inner.engine {
            Engine::Mongo(db) => {
                db.run_command(doc! { "ping": 1 }).await.context("Pinging server")?;
                Ok(())
            }
            Engine::Memory(_) => Ok(()),
        }
    }
}

impl Deref for Database {
    type Target = DatabaseInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

/// A fluent builder for configuring and establishing a store connection.
#[must_use = "builders do nothing unless you call .init()"]
#[derive(Debug, Default)]
pub struct DatabaseBuilder {
    url: Option<String>,
    name: Option<String>,
    retries: Option<u32>,
}

impl DatabaseBuilder {
    /// Sets the connection URL; its scheme selects the engine.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the logical database name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Number of health checks attempted before giving up (minimum one).
    pub const fn retries(mut self, retries: u32) -> Self {
        self.retries = Some(retries);
        self
    }

    /// Consumes the builder and connects.
    ///
    /// # Process
    /// 1. **Validation**: URL and database name must be present and the scheme known.
    /// 2. **Engine Initialization**: builds the driver client or the in-process engine.
    /// 3. **Resilience**: for MongoDB, pings up to `retries` times with exponential backoff
    ///    starting at 500ms. Requests made later are never retried.
    ///
    /// # Errors
    /// * [`DatabaseError::Validation`] if a parameter is missing or the scheme is unknown.
    /// * [`DatabaseError::Driver`] if the connection string is rejected by the driver.
    /// * [`DatabaseError::Connection`] if the server stays unreachable.
    #[instrument(skip(self), fields(database = self.name))]
    pub async fn init(self) -> Result<Database, DatabaseError> {
        let url = self.url.filter(|u| !u.trim().is_empty()).ok_or(DatabaseError::Validation {
            message: "URL is required".into(),
            context: None,
        })?;
        let name = self.name.filter(|n| !n.trim().is_empty()).ok_or(DatabaseError::Validation {
            message: "Database name is required".into(),
            context: None,
        })?;

        if url.starts_with(MEMORY_SCHEME) {
            info!(database = %name, "In-process document store initialized");
            let engine = Engine::Memory(Arc::new(MemoryEngine::default()));
            return Ok(Database { inner: Arc::new(DatabaseInner { engine, name }) });
        }

        if !MONGODB_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
            return Err(DatabaseError::Validation {
                message: "unsupported URL scheme; expected mongodb://, mongodb+srv:// or mem://"
                    .into(),
                context: None,
            });
        }

        let client =
            mongodb::Client::with_uri_str(&url).await.context("Parsing connection string")?;
        let db = client.database(&name);

        let attempts = self.retries.unwrap_or(DEFAULT_CONNECT_RETRIES).max(1);
        let mut delay = Duration::from_millis(500);
        for attempt in 1..=attempts {
            match db.run_command(doc! { "ping": 1 }).await {
                Ok(_) => break,
                Err(e) if attempt == attempts => {
                    return Err(DatabaseError::Connection {
                        message: e.to_string().into(),
                        context: Some("Unhealthy after retries".into()),
                    });
                }
                Err(e) => {
                    warn!(attempt, ?delay, error = %e, "Database not ready, retrying...");
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }

        info!(database = %name, "MongoDB connection established");
        let engine = Engine::Mongo(db);
        Ok(Database { inner: Arc::new(DatabaseInner { engine, name }) })
    }
}

#[derive(Debug, Clone)]
enum Backend {
    Mongo(mongodb::Collection<Document>),
    Memory(MemoryCollection),
}

/// A handle to one collection of raw BSON documents.
#[derive(Debug, Clone)]
pub struct Collection {
    name: String,
    backend: Backend,
}

impl Collection {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Inserts one document. An `_id` is generated when the document has none.
    ///
    /// # Errors
    /// Propagates driver failures and duplicate-key rejections.
    #[instrument(skip_all, fields(collection = %self.name))]
    pub async fn insert_one(&self, document: Document) -> Result<InsertOutcome, DatabaseError> {
        let outcome = match &self.backend {
            Backend::Mongo(c) => {
                let result = c.insert_one(document).await.context("insert_one")?;
                InsertOutcome { inserted_id: result.inserted_id, inserted_count: 1 }
            }
            Backend::Memory(c) => c.insert_one(document)?,
        };
        debug!(inserted_id = %outcome.inserted_id, "Document inserted");
        Ok(outcome)
    }

    /// Finds the first document matching `filter`, optionally projected.
    ///
    /// # Errors
    /// Propagates driver failures and unsupported query shapes.
    #[instrument(skip_all, fields(collection = %self.name))]
    pub async fn find_one(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Option<Document>, DatabaseError> {
        match &self.backend {
            Backend::Mongo(c) => {
                let mut action = c.find_one(filter);
                if let Some(projection) = projection {
                    action = action.projection(projection);
                }
                Ok(action.await.context("find_one")?)
            }
            Backend::Memory(c) => c.find_one(&filter, projection.as_ref()),
        }
    }

    /// Finds up to `limit` documents matching `filter`, in store order.
    ///
    /// # Errors
    /// Propagates driver and cursor failures.
    #[instrument(skip_all, fields(collection = %self.name, limit))]
    pub async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
        limit: i64,
    ) -> Result<Vec<Document>, DatabaseError> {
        match &self.backend {
            Backend::Mongo(c) => {
                let mut action = c.find(filter).limit(limit);
                if let Some(projection) = projection {
                    action = action.projection(projection);
                }
                let mut cursor = action.await.context("find")?;
                let mut documents = Vec::new();
                while cursor.advance().await.context("Advancing cursor")? {
                    documents.push(cursor.deserialize_current().context("Reading cursor")?);
                }
                Ok(documents)
            }
            Backend::Memory(c) => {
                // Same convention as the server: zero means unlimited, the sign is ignored.
                let limit = usize::try_from(limit.unsigned_abs())
                    .ok()
                    .filter(|&n| n > 0)
                    .unwrap_or(usize::MAX);
                c.find(&filter, projection.as_ref(), limit)
            }
        }
    }

    /// Applies an operator update (`$set`, `$push`) to the first matching document.
    ///
    /// # Errors
    /// Propagates driver failures and rejected writes.
    #[instrument(skip_all, fields(collection = %self.name))]
    pub async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateOutcome, DatabaseError> {
        match &self.backend {
            Backend::Mongo(c) => {
                let result = c.update_one(filter, update).await.context("update_one")?;
                Ok(UpdateOutcome {
                    matched_count: result.matched_count,
                    modified_count: result.modified_count,
                })
            }
            Backend::Memory(c) => c.update_one(&filter, &update),
        }
    }

    /// Replaces the first matching document, keeping its `_id`.
    ///
    /// # Errors
    /// Propagates driver failures.
    #[instrument(skip_all, fields(collection = %self.name))]
    pub async fn replace_one(
        &self,
        filter: Document,
        replacement: Document,
    ) -> Result<UpdateOutcome, DatabaseError> {
        match &self.backend {
            Backend::Mongo(c) => {
                let result = c.replace_one(filter, replacement).await.context("replace_one")?;
                Ok(UpdateOutcome {
                    matched_count: result.matched_count,
                    modified_count: result.modified_count,
                })
            }
            Backend::Memory(c) => c.replace_one(&filter, replacement),
        }
    }
}
