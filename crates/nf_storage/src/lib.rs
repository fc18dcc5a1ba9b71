use std::path::Path;
use std::sync::Arc;

use nf_core::{ArticleStorage, Error, Result};

pub mod backends;

pub use backends::*;

pub const DEFAULT_DB_PATH: &str = "articles.db";

/// Build a storage backend by name (`memory` or `sqlite`).
pub async fn create_storage(kind: &str, db_path: Option<&Path>) -> Result<Arc<dyn ArticleStorage>> {
    match kind {
        "memory" => Ok(Arc::new(InMemoryStorage::new())),
        #[cfg(feature = "sqlite")]
        "sqlite" => {
            let path = db_path.unwrap_or_else(|| Path::new(DEFAULT_DB_PATH));
            Ok(Arc::new(SQLiteStorage::new_with_path(path).await?))
        }
        other => {
            let _ = db_path;
            Err(Error::Config(format!("Unsupported storage backend: {}", other)))
        }
    }
}
