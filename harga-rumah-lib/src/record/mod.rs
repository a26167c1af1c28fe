use serde::{Deserialize, Serialize};

use crate::table::Table;

/// Typed view of one clean-store row, consumed by the prediction and
/// dashboard collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub luas_meter2: f64,
    pub kamar_tidur: i64,
    pub kamar_mandi: i64,
    pub jarak_ke_kota: f64,
    pub tahun_bangun: i64,
    pub lokasi: String,
    pub harga: i64,
    pub provinsi: Option<String>,
    pub kota: Option<String>,
    pub kecamatan: Option<String>,
}

impl CleanRecord {
    /// Builds the typed view of a single row. Returns `None` when a
    /// required field is absent or fails numeric conversion; callers treat
    /// that as a per-row degrade, not a batch failure.
    pub fn from_row(table: &Table, row: usize) -> Option<CleanRecord> {
        Some(CleanRecord {
            luas_meter2: parse_f64(table.cell(row, "luas_meter2")?)?,
            kamar_tidur: parse_i64(table.cell(row, "kamar_tidur")?)?,
            kamar_mandi: parse_i64(table.cell(row, "kamar_mandi")?)?,
            jarak_ke_kota: parse_f64(table.cell(row, "jarak_ke_kota")?)?,
            tahun_bangun: parse_i64(table.cell(row, "tahun_bangun")?)?,
            lokasi: table.cell(row, "lokasi")?.to_string(),
            harga: parse_i64(table.cell(row, "harga")?)?,
            provinsi: table.cell(row, "provinsi").map(str::to_string),
            kota: table.cell(row, "kota").map(str::to_string),
            kecamatan: table.cell(row, "kecamatan").map(str::to_string),
        })
    }

    /// Converts a whole clean table, skipping rows that fail conversion.
    pub fn from_table(table: &Table) -> Vec<CleanRecord> {
        (0..table.len())
            .filter_map(|row| {
                let record = Self::from_row(table, row);
                if record.is_none() {
                    tracing::warn!("Skipping clean-store row {} with unparseable fields", row);
                }
                record
            })
            .collect()
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector {
            luas_meter2: self.luas_meter2,
            kamar_tidur: self.kamar_tidur,
            kamar_mandi: self.kamar_mandi,
            jarak_ke_kota: self.jarak_ke_kota,
            tahun_bangun: self.tahun_bangun,
        }
    }
}

/// The ordered feature 5-tuple handed to the prediction collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub luas_meter2: f64,
    pub kamar_tidur: i64,
    pub kamar_mandi: i64,
    pub jarak_ke_kota: f64,
    pub tahun_bangun: i64,
}

impl FeatureVector {
    /// The contract ordering: area, bedrooms, bathrooms, distance, year.
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.luas_meter2,
            self.kamar_tidur as f64,
            self.kamar_mandi as f64,
            self.jarak_ke_kota,
            self.tahun_bangun as f64,
        ]
    }
}

/// The prediction collaborator: a pre-fit rescaling plus a fixed-topology
/// ensemble regressor, opaque to the importer. Implementations live outside
/// this crate; nothing here re-derives scaler parameters or model weights.
pub trait PricePredictor {
    fn predict(&self, features: &FeatureVector) -> f64;
}

fn parse_f64(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok()
}

fn parse_i64(cell: &str) -> Option<i64> {
    let trimmed = cell.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().map(|value| value as i64))
}
