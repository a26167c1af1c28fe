use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::ImportError;
use crate::table::Table;

/// Well-known store file locations under a data directory.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub raw_path: PathBuf,
    pub clean_path: PathBuf,
}

impl StoreConfig {
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        let data_dir = data_dir.into();
        Self {
            raw_path: data_dir.join("raw_dataset.csv"),
            clean_path: data_dir.join("cleaned_dataset.csv"),
        }
    }
}

/// Owns the persisted raw store and the derived clean store. The raw store
/// is the deduplicated union of every clean batch ever ingested; the clean
/// store is the raw store minus null-bearing and duplicate rows, read-only
/// for the prediction and dashboard collaborators.
///
/// The read-merge-write cycle runs under a per-store mutex and files are
/// replaced via write-temp-then-rename, so readers never observe a partial
/// write and concurrent ingestions cannot interleave.
pub struct DatasetStore {
    config: StoreConfig,
    lock: Mutex<()>,
}

impl DatasetStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            lock: Mutex::new(()),
        }
    }

    pub fn raw_path(&self) -> &Path {
        &self.config.raw_path
    }

    pub fn clean_path(&self) -> &Path {
        &self.config.clean_path
    }

    pub async fn load_raw(&self) -> Result<Option<Table>, ImportError> {
        load_table(&self.config.raw_path)
    }

    pub async fn load_clean(&self) -> Result<Option<Table>, ImportError> {
        load_table(&self.config.clean_path)
    }

    /// Merges a sanitized batch into the raw store and persists the result.
    /// Without a prior store the batch becomes the store verbatim; otherwise
    /// the prior rows are unioned with the batch (store columns first, new
    /// derived columns appended) and exact duplicates are removed, which is
    /// what makes re-ingestion a no-op. Returns the merged table and the
    /// number of rows the batch actually added.
    pub async fn ingest(&self, batch: Table) -> Result<(Table, usize), ImportError> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| ImportError::Processing("Raw store lock poisoned".to_string()))?;

        let (merged, added) = match load_table(&self.config.raw_path)? {
            Some(prior) => {
                let prior_rows = prior.len();
                let mut merged = prior.union(&batch);
                let duplicates = merged.dedup_rows();
                tracing::debug!(
                    "Merged batch of {} rows into store of {} ({} duplicates removed)",
                    batch.len(),
                    prior_rows,
                    duplicates
                );
                let added = merged.len().saturating_sub(prior_rows);
                (merged, added)
            }
            None => {
                tracing::info!("No prior raw store; batch becomes the store");
                let added = batch.len();
                (batch, added)
            }
        };

        write_table_atomic(&self.config.raw_path, &merged)?;
        tracing::info!(
            "Raw store now has {} rows at {:?}",
            merged.len(),
            self.config.raw_path
        );
        Ok((merged, added))
    }

    /// Rebuilds the clean store from the merged raw table: any row still
    /// carrying a missing value (older rows predate derived columns) and any
    /// duplicate is dropped before persisting.
    pub async fn refresh_clean(&self, raw: &Table) -> Result<Table, ImportError> {
        let mut clean = raw.clone();
        let (incomplete, duplicates) = clean.sanitize();
        tracing::debug!(
            "Clean store rebuilt: {} rows ({} incomplete, {} duplicate rows dropped)",
            clean.len(),
            incomplete,
            duplicates
        );
        write_table_atomic(&self.config.clean_path, &clean)?;
        Ok(clean)
    }
}

fn load_table(path: &Path) -> Result<Option<Table>, ImportError> {
    if !path.exists() {
        return Ok(None);
    }
    let file = fs::File::open(path)?;
    Ok(Some(Table::from_csv_reader(file)?))
}

fn write_table_atomic(path: &Path, table: &Table) -> Result<(), ImportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = path.with_extension("csv.tmp");
    let file = fs::File::create(&tmp_path)?;
    table.write_csv(file)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(value: &str) -> Option<String> {
        Some(value.to_string())
    }

    fn batch(prices: &[&str]) -> Table {
        let mut table = Table::new(vec!["harga".to_string(), "lokasi".to_string()]);
        for price in prices {
            table.push_row(vec![cell(price), cell("Jawa Barat Bandung")]);
        }
        table
    }

    #[tokio::test]
    async fn first_ingest_creates_the_store_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(StoreConfig::new(dir.path()));

        let (merged, added) = store.ingest(batch(&["100", "200"])).await.unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(added, 2);
        assert!(store.raw_path().exists());

        let reloaded = store.load_raw().await.unwrap().unwrap();
        assert_eq!(reloaded, merged);
    }

    #[tokio::test]
    async fn reingesting_a_batch_changes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(StoreConfig::new(dir.path()));

        let (first, _) = store.ingest(batch(&["100", "200"])).await.unwrap();
        let (second, added) = store.ingest(batch(&["100", "200"])).await.unwrap();
        assert_eq!(second, first);
        assert_eq!(added, 0);

        let (third, added) = store.ingest(batch(&["100", "200"])).await.unwrap();
        assert_eq!(third, first);
        assert_eq!(added, 0);
    }

    #[tokio::test]
    async fn new_derived_columns_persist_and_old_rows_get_nulls() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(StoreConfig::new(dir.path()));

        store.ingest(batch(&["100"])).await.unwrap();

        let mut wider = batch(&["300"]);
        wider
            .add_column("provinsi", vec![cell("Jawa")])
            .unwrap();
        let (merged, added) = store.ingest(wider).await.unwrap();

        assert_eq!(added, 1);
        assert_eq!(merged.columns(), ["harga", "lokasi", "provinsi"]);
        assert_eq!(merged.cell(0, "provinsi"), None);
        assert_eq!(merged.cell(1, "provinsi"), Some("Jawa"));

        // The widened schema survives the next ingestion.
        let (merged, _) = store.ingest(batch(&["400"])).await.unwrap();
        assert!(merged.has_column("provinsi"));
    }

    #[tokio::test]
    async fn clean_store_drops_null_bearing_union_rows() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(StoreConfig::new(dir.path()));

        store.ingest(batch(&["100"])).await.unwrap();
        let mut wider = batch(&["300"]);
        wider
            .add_column("provinsi", vec![cell("Jawa")])
            .unwrap();
        let (merged, _) = store.ingest(wider).await.unwrap();

        let clean = store.refresh_clean(&merged).await.unwrap();
        assert_eq!(clean.len(), 1);
        assert_eq!(clean.cell(0, "harga"), Some("300"));

        let reloaded = store.load_clean().await.unwrap().unwrap();
        assert_eq!(reloaded, clean);
    }

    #[tokio::test]
    async fn no_temp_file_is_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(StoreConfig::new(dir.path()));
        store.ingest(batch(&["100"])).await.unwrap();

        let tmp = store.raw_path().with_extension("csv.tmp");
        assert!(!tmp.exists());
    }
}
