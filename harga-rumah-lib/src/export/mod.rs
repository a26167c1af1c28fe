use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::record::FeatureVector;

/// The chart kinds offered by the dashboard. Image rendering happens in the
/// dashboard collaborator; this crate only names the artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    TrenHargaPerTahun,
    DistribusiHarga,
    HubunganLuasHarga,
    PerbandinganKamar,
}

impl ChartKind {
    pub fn slug(&self) -> &'static str {
        match self {
            ChartKind::TrenHargaPerTahun => "tren_harga_per_tahun",
            ChartKind::DistribusiHarga => "distribusi_harga",
            ChartKind::HubunganLuasHarga => "hubungan_luas-harga",
            ChartKind::PerbandinganKamar => "perbandingan_kamar",
        }
    }
}

/// The user-chosen input parameters behind one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionInput {
    pub luas_meter2: f64,
    pub kamar_tidur: i64,
    pub kamar_mandi: i64,
    pub jarak_ke_kota: f64,
    pub tahun_bangun: i64,
}

impl PredictionInput {
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

#[derive(Debug, Clone, PartialEq)]
pub struct ExportPaths {
    pub results: PathBuf,
    pub chart: PathBuf,
}

/// Writes the two export artifacts: a results CSV of the chosen parameters
/// and the rendered chart image, both named with the capture timestamp.
pub fn export_prediction(
    output_dir: &Path,
    input: &PredictionInput,
    chart: ChartKind,
    image: &[u8],
    captured_at: DateTime<Local>,
) -> Result<ExportPaths, ImportError> {
    let base = format!("hasil_prediksi_{}", captured_at.format("%Y%m%d_%H%M%S"));

    fs::create_dir_all(output_dir)?;
    let results_path = output_dir.join(format!("{base}.csv"));
    let mut writer = csv::Writer::from_writer(fs::File::create(&results_path)?);
    writer.write_record(["parameter", "nilai"])?;
    writer.write_record(["Luas", &input.luas_meter2.to_string()])?;
    writer.write_record(["Kamar Tidur", &input.kamar_tidur.to_string()])?;
    writer.write_record(["Kamar Mandi", &input.kamar_mandi.to_string()])?;
    writer.write_record(["Jarak ke Kota", &input.jarak_ke_kota.to_string()])?;
    writer.write_record(["Tahun Bangun", &input.tahun_bangun.to_string()])?;
    writer.flush()?;

    let chart_dir = output_dir.join("visualizations");
    fs::create_dir_all(&chart_dir)?;
    let chart_path = chart_dir.join(format!("{base}_{}.png", chart.slug()));
    fs::write(&chart_path, image)?;

    tracing::info!(
        "Exported prediction results to {:?} and chart to {:?}",
        results_path,
        chart_path
    );
    Ok(ExportPaths {
        results: results_path,
        chart: chart_path,
    })
}
