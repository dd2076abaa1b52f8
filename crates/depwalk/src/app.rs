//! Application context for CLI command execution.
//!
//! [`App`] owns the loaded document store, the resolved configuration and
//! the optional known-id filter, and hands out [`DependencyGraph`]s built
//! from them.
//!
//! # Example
//!
//! ```no_run
//! use depwalk::app::App;
//! use depwalk::config::DepwalkConfig;
//! use std::path::PathBuf;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = DepwalkConfig::default();
//!     config.store.data_file = Some(PathBuf::from("data/libraries.jsonl"));
//!
//!     let app = App::from_config(config).await?;
//!     let result = app.graph()?.traverse("flask", 2).await?;
//!     println!("{} libraries", result.len());
//!     Ok(())
//! }
//! ```

use crate::config::DepwalkConfig;
use crate::error::Result;
use crate::store::DocumentStore;
use crate::store::in_memory::{InMemoryStore, LoadWarning};
use crate::traversal::{DependencyGraph, KnownIdFilter, KnownIdSet};
use std::sync::Arc;

/// Application context for CLI operations.
pub struct App {
    /// The document store (trait object for polymorphism)
    store: Arc<dyn DocumentStore>,

    /// Resolved configuration
    config: DepwalkConfig,

    /// Known-id filter, if one was configured
    filter: Option<Arc<KnownIdSet>>,

    /// Problems found while loading documents
    load_warnings: Vec<LoadWarning>,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("store", &"<dyn DocumentStore>")
            .field("filter_ids", &self.filter.as_ref().map(|set| set.len()))
            .field("load_warnings", &self.load_warnings.len())
            .finish()
    }
}

impl App {
    /// Create an App by loading the store and filter named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid or names no data file
    /// - The data file or known-id file cannot be read
    /// - `store.strict` is set and the data file has a bad record
    pub async fn from_config(config: DepwalkConfig) -> Result<Self> {
        config.validate()?;
        let data_file = config.data_file()?;

        let (store, load_warnings) = if config.store.strict {
            (InMemoryStore::load_strict(data_file).await?, Vec::new())
        } else {
            InMemoryStore::load(data_file).await?
        };

        let mut filter = match &config.traversal.known_ids_file {
            Some(path) => Some(KnownIdSet::load(path).await?),
            None => None,
        };
        if config.traversal.filter_by_store_ids {
            filter
                .get_or_insert_with(KnownIdSet::new)
                .merge(store.known_ids());
        }
        if let Some(set) = &filter {
            tracing::debug!(ids = set.len(), "Known-id filter enabled");
        }

        Ok(Self {
            store: Arc::new(store),
            config,
            filter: filter.map(Arc::new),
            load_warnings,
        })
    }

    /// Get the document store.
    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Get the resolved configuration.
    pub fn config(&self) -> &DepwalkConfig {
        &self.config
    }

    /// Warnings collected while loading the data file.
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    /// Number of ids in the known-id filter, if one is active.
    pub fn filter_len(&self) -> Option<usize> {
        self.filter.as_ref().map(|set| set.len())
    }

    /// Build a traversal engine over the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the traversal options are invalid.
    pub fn graph(&self) -> Result<DependencyGraph> {
        let graph = DependencyGraph::new(Arc::clone(&self.store))
            .with_options(self.config.traversal_options())?;
        Ok(match &self.filter {
            Some(set) => graph.with_filter(Arc::clone(set) as Arc<dyn KnownIdFilter>),
            None => graph,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn data_file() -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(
            file,
            r#"{{"id":"flask","pk":"f","name":"flask","dependencies":[{{"id":"click","pk":"c"}},{{"id":"absent","pk":"a"}}]}}"#
        )
        .unwrap();
        writeln!(file, r#"{{"id":"click","pk":"c","name":"click"}}"#).unwrap();
        file
    }

    fn config_for(file: &NamedTempFile) -> DepwalkConfig {
        let mut config = DepwalkConfig::default();
        config.store.data_file = Some(file.path().to_path_buf());
        config
    }

    #[tokio::test]
    async fn test_from_config_loads_store() {
        let file = data_file();

        let app = App::from_config(config_for(&file)).await.unwrap();

        assert_eq!(app.store().count().await.unwrap(), 2);
        assert!(app.load_warnings().is_empty());
        assert_eq!(app.filter_len(), None);
    }

    #[tokio::test]
    async fn test_from_config_requires_data_file() {
        let result = App::from_config(DepwalkConfig::default()).await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingDataFile))
        ));
    }

    #[tokio::test]
    async fn test_store_ids_filter_skips_absent_lookups() {
        let file = data_file();
        let mut config = config_for(&file);
        config.traversal.filter_by_store_ids = true;

        let app = App::from_config(config).await.unwrap();
        let result = app.graph().unwrap().traverse("flask", 1).await.unwrap();

        assert_eq!(app.filter_len(), Some(2));
        assert_eq!(result.len(), 2);
        assert!(result.missing.is_empty());
        assert_eq!(result.stats.filtered_out, 1);
    }

    #[tokio::test]
    async fn test_lenient_load_keeps_warnings() {
        let mut file = data_file();
        writeln!(file, "{{broken").unwrap();

        let app = App::from_config(config_for(&file)).await.unwrap();

        assert_eq!(app.store().count().await.unwrap(), 2);
        assert_eq!(app.load_warnings().len(), 1);
    }

    #[tokio::test]
    async fn test_strict_load_rejects_bad_record() {
        let mut file = data_file();
        writeln!(file, "{{broken").unwrap();
        let mut config = config_for(&file);
        config.store.strict = true;

        let result = App::from_config(config).await;

        assert!(matches!(result, Err(Error::InvalidFormat(ref m)) if m.starts_with("line 3: ")));
    }

    #[tokio::test]
    async fn test_debug_hides_store() {
        let file = data_file();
        let app = App::from_config(config_for(&file)).await.unwrap();
        assert!(format!("{app:?}").contains("<dyn DocumentStore>"));
    }
}
