pub mod database;
pub mod store;
pub mod supabase;

use std::sync::Arc;

use crate::config::StoreConfig;

pub use database::Database;
pub use store::{DatabaseError, RecipeStore};
pub use supabase::SupabaseStore;

/// Opens the store selected by configuration.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn RecipeStore>, DatabaseError> {
    match config {
        StoreConfig::Supabase { url, anon_key } => Ok(Arc::new(SupabaseStore::new(url, anon_key)?)),
        StoreConfig::Sqlite { path } => {
            log::info!("Using SQLite recipe store at {}", path.display());
            Ok(Arc::new(Database::new(path).await?))
        }
    }
}
