//! Harga Rumah Importer Library
//!
//! This library ingests heterogeneous tabular uploads of Indonesian house
//! price listings, reconciles them against the canonical listing schema,
//! cleans them, and accumulates a deduplicated raw store plus a derived
//! clean store for the prediction and dashboard services.

pub mod analysis;
mod error;
mod excel;
mod export;
mod importer;
mod parse;
mod reader;
mod record;
mod schema;
mod store;
mod table;

pub use error::{ImportError, ImportMessage, ImportOutcome, ImportState};
pub use export::{export_prediction, ChartKind, ExportPaths, PredictionInput};
pub use importer::{ImportReport, Importer};
pub use parse::{clean_price, LocationParser};
pub use reader::{read_table, UploadFormat};
pub use record::{CleanRecord, FeatureVector, PricePredictor};
pub use schema::{validate_required, CanonicalField, SynonymTable};
pub use store::{DatasetStore, StoreConfig};
pub use table::Table;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;
    use tracing::info;

    static INIT: Once = Once::new();

    /// Initialize logging exactly once for all tests
    fn init_logging() {
        INIT.call_once(|| {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_max_level(tracing::Level::DEBUG)
                .init();
        });
    }

    #[tokio::test]
    async fn upload_reaches_the_clean_store_end_to_end() {
        init_logging();

        let dir = tempfile::tempdir().unwrap();
        let store = DatasetStore::new(StoreConfig::new(dir.path()));
        let importer = Importer::with_default_mapping(store);

        info!("Ingesting an aliased CSV upload");
        let csv = b"area,kamar,toilet,jarak,tahun,alamat,price\n\
            150,4,2,3.2,2019,Jawa Tengah Semarang (Tembalang),3.500.000\n";
        let report = importer
            .process_upload(csv, UploadFormat::Csv)
            .await
            .unwrap();
        assert_eq!(report.store_rows, 1);

        info!("Reading the clean store back as typed records");
        let clean = importer.store().load_clean().await.unwrap().unwrap();
        let records = CleanRecord::from_table(&clean);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].harga, 3_500_000);
        assert_eq!(records[0].provinsi.as_deref(), Some("Jawa"));
        assert_eq!(records[0].features().as_array(), [150.0, 4.0, 2.0, 3.2, 2019.0]);
    }
}
