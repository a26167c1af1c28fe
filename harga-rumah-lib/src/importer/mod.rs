use crate::error::{ImportError, ImportState};
use crate::parse::{self, LocationParser};
use crate::reader::{self, UploadFormat};
use crate::schema::{self, SynonymTable};
use crate::store::DatasetStore;
use crate::table::Table;

/// What a successful upload did: the merged raw store, how much the batch
/// contributed, and any non-fatal degradations recorded along the way.
#[derive(Debug)]
pub struct ImportReport {
    /// Sanitized batch size, before merging.
    pub batch_rows: usize,
    /// Rows the batch actually added to the raw store.
    pub new_rows: usize,
    /// Raw store size after the merge.
    pub store_rows: usize,
    /// The full merged raw store.
    pub store: Table,
    pub state: ImportState,
}

/// The five-stage ingestion pipeline: reconcile, validate, parse, sanitize,
/// accumulate. One upload runs to completion per invocation; fatal errors
/// abort before anything is persisted.
pub struct Importer {
    synonyms: SynonymTable,
    location: LocationParser,
    store: DatasetStore,
}

impl Importer {
    pub fn new(synonyms: SynonymTable, store: DatasetStore) -> Self {
        Self {
            synonyms,
            location: LocationParser::new(),
            store,
        }
    }

    pub fn with_default_mapping(store: DatasetStore) -> Self {
        Self::new(SynonymTable::default_mapping(), store)
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn store(&self) -> &DatasetStore {
        &self.store
    }

    /// Runs an upload through the full pipeline and persists the result.
    pub async fn process_upload(
        &self,
        bytes: &[u8],
        format: UploadFormat,
    ) -> Result<ImportReport, ImportError> {
        tracing::info!("Processing {} upload ({} bytes)", format, bytes.len());
        let mut state = ImportState::new();

        let table = reader::read_table(bytes, format)?;
        tracing::debug!(
            "Decoded {} rows with columns {:?}",
            table.len(),
            table.columns()
        );

        let mut table = self.synonyms.reconcile(&table);
        schema::validate_required(&table)?;

        self.location.parse_location(&mut table, &mut state);
        parse::clean_price(&mut table, &mut state);

        let (incomplete, duplicates) = table.sanitize();
        tracing::info!(
            "Sanitized batch: {} rows kept ({} incomplete, {} duplicate rows dropped)",
            table.len(),
            incomplete,
            duplicates
        );

        let batch_rows = table.len();
        let (merged, new_rows) = self.store.ingest(table).await?;
        self.store.refresh_clean(&merged).await?;

        Ok(ImportReport {
            batch_rows,
            new_rows,
            store_rows: merged.len(),
            store: merged,
            state,
        })
    }

    /// Stages 1–2 only: checks that an upload satisfies the canonical schema
    /// without touching the stores. Returns the reconciled table.
    pub async fn validate_upload(
        &self,
        bytes: &[u8],
        format: UploadFormat,
    ) -> Result<Table, ImportError> {
        let table = reader::read_table(bytes, format)?;
        let reconciled = self.synonyms.reconcile(&table);
        schema::validate_required(&reconciled)?;
        Ok(reconciled)
    }
}
