use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{DocumentStore, LocalDocumentStore, ResultEngine};

mod access;
mod geolocation;
mod registration;
mod uniqueness;

pub use access::Caller;
pub use registration::RegisteredPatient;

/// Default upper bound for an uploaded license document.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 5 * 1024 * 1024;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The rollback happens when the transaction is dropped without a commit.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of every workflow. It holds no per-request state: all
/// coordination between concurrent requests goes through the database.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    documents: Arc<dyn DocumentStore>,
    max_document_bytes: usize,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Largest license document accepted by [`Engine::register_pharmacy`].
    pub fn max_document_bytes(&self) -> usize {
        self.max_document_bytes
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    documents: Option<Arc<dyn DocumentStore>>,
    max_document_bytes: Option<usize>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Where license documents are written. Defaults to `./uploads`.
    pub fn documents(mut self, store: Arc<dyn DocumentStore>) -> EngineBuilder {
        self.documents = Some(store);
        self
    }

    pub fn max_document_bytes(mut self, max: usize) -> EngineBuilder {
        self.max_document_bytes = Some(max);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let documents = self
            .documents
            .unwrap_or_else(|| Arc::new(LocalDocumentStore::new("uploads", "/uploads")));
        Ok(Engine {
            database: self.database,
            documents,
            max_document_bytes: self.max_document_bytes.unwrap_or(DEFAULT_MAX_DOCUMENT_BYTES),
        })
    }
}
