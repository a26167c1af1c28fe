use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use crate::error::ImportError;
use crate::table::Table;

/// The seven fields every upload must ultimately expose. The set is closed;
/// the declaration order is the canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CanonicalField {
    LuasMeter2,
    KamarTidur,
    KamarMandi,
    JarakKeKota,
    TahunBangun,
    Lokasi,
    Harga,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::LuasMeter2,
        CanonicalField::KamarTidur,
        CanonicalField::KamarMandi,
        CanonicalField::JarakKeKota,
        CanonicalField::TahunBangun,
        CanonicalField::Lokasi,
        CanonicalField::Harga,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::LuasMeter2 => "luas_meter2",
            CanonicalField::KamarTidur => "kamar_tidur",
            CanonicalField::KamarMandi => "kamar_mandi",
            CanonicalField::JarakKeKota => "jarak_ke_kota",
            CanonicalField::TahunBangun => "tahun_bangun",
            CanonicalField::Lokasi => "lokasi",
            CanonicalField::Harga => "harga",
        }
    }

    pub fn from_name(name: &str) -> Option<CanonicalField> {
        CanonicalField::ALL
            .iter()
            .copied()
            .find(|field| field.as_str() == name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable mapping from canonical fields to the raw column-name aliases
/// seen across uploaded files. Constructed once; reconciliation is a pure
/// function of the table and this value.
#[derive(Debug, Clone)]
pub struct SynonymTable {
    aliases: HashMap<CanonicalField, Vec<String>>,
    inverse: HashMap<String, CanonicalField>,
}

impl SynonymTable {
    /// Builds a table after checking the uniqueness invariant: an alias that
    /// maps to two canonical fields is a construction error, not a tolerated
    /// ambiguity.
    pub fn new(aliases: HashMap<CanonicalField, Vec<String>>) -> Result<Self, ImportError> {
        let mut inverse = HashMap::new();
        for field in CanonicalField::ALL {
            for alias in aliases.get(&field).map(Vec::as_slice).unwrap_or(&[]) {
                if let Some(previous) = inverse.insert(alias.clone(), field) {
                    return Err(ImportError::InvalidSynonyms(format!(
                        "Alias '{}' maps to both '{}' and '{}'",
                        alias, previous, field
                    )));
                }
            }
        }
        Ok(Self { aliases, inverse })
    }

    /// The built-in alias mapping, covering the column-name variants seen
    /// across uploaded files.
    pub fn default_mapping() -> Self {
        let aliases = [
            (
                CanonicalField::LuasMeter2,
                vec!["luas_meter2", "luas", "area", "luas_bangunan", "size"],
            ),
            (
                CanonicalField::KamarTidur,
                vec!["kamar_tidur", "kamar", "bedrooms", "jumlah_kamar", "room"],
            ),
            (
                CanonicalField::KamarMandi,
                vec!["kamar_mandi", "toilet", "jumlah_toilet", "bathroom"],
            ),
            (
                CanonicalField::JarakKeKota,
                vec!["jarak_ke_kota", "jarak", "distance", "proximity"],
            ),
            (
                CanonicalField::TahunBangun,
                vec![
                    "tahun_bangun",
                    "tahun_dibangun",
                    "construction_year",
                    "year",
                ],
            ),
            (
                CanonicalField::Lokasi,
                vec!["lokasi", "wilayah", "alamat", "location"],
            ),
            (
                CanonicalField::Harga,
                vec!["harga", "harga_rumah", "price", "nilai_properti", "cost"],
            ),
        ]
        .into_iter()
        .map(|(field, aliases)| {
            (
                field,
                aliases.into_iter().map(str::to_string).collect::<Vec<_>>(),
            )
        })
        .collect();

        // The built-in mapping satisfies the uniqueness invariant.
        Self::new(aliases).unwrap()
    }

    /// Loads a mapping from a JSON file of the form
    /// `{"luas_meter2": ["luas", ...], ...}`. All seven canonical fields
    /// must be present as keys.
    pub fn from_file<P: Into<PathBuf>>(path: P) -> Result<Self, ImportError> {
        let path = path.into();
        tracing::info!("Loading synonym table from {:?}", path);
        let file = std::fs::File::open(&path)?;
        let raw: HashMap<String, Vec<String>> = serde_json::from_reader(file)?;

        let mut aliases = HashMap::new();
        for (name, synonyms) in raw {
            let field = CanonicalField::from_name(&name).ok_or_else(|| {
                ImportError::InvalidSynonyms(format!("Unknown canonical field '{}'", name))
            })?;
            aliases.insert(field, synonyms);
        }
        for field in CanonicalField::ALL {
            if !aliases.contains_key(&field) {
                return Err(ImportError::InvalidSynonyms(format!(
                    "No aliases defined for canonical field '{}'",
                    field
                )));
            }
        }
        Self::new(aliases)
    }

    pub fn aliases_for(&self, field: CanonicalField) -> &[String] {
        self.aliases.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn canonical_for(&self, alias: &str) -> Option<CanonicalField> {
        self.inverse.get(alias).copied()
    }

    /// Stage 1 of the pipeline. Renames every column whose name matches a
    /// known alias, keeps the first occurrence when two input columns land
    /// on the same canonical field, silently drops unmatched columns, and
    /// orders the output canonically. Absent fields are the validator's
    /// concern, not an error here.
    pub fn reconcile(&self, table: &Table) -> Table {
        let mut picks: Vec<(CanonicalField, usize)> = Vec::new();
        let mut taken: HashSet<CanonicalField> = HashSet::new();

        for (idx, name) in table.columns().iter().enumerate() {
            match self.canonical_for(name) {
                Some(field) => {
                    if taken.insert(field) {
                        picks.push((field, idx));
                    } else {
                        tracing::warn!(
                            "Column '{}' also maps to '{}'; keeping the first occurrence",
                            name,
                            field
                        );
                    }
                }
                None => {
                    tracing::debug!("Dropping unmapped column '{}'", name);
                }
            }
        }

        picks.sort_by_key(|(field, _)| *field);
        let picks: Vec<(String, usize)> = picks
            .into_iter()
            .map(|(field, idx)| (field.as_str().to_string(), idx))
            .collect();
        table.select(&picks)
    }
}

/// Stage 2 of the pipeline: the hard completeness gate. Every canonical
/// field must be present as a column, even if empty of values. The failure
/// carries the exact missing set in canonical order.
pub fn validate_required(table: &Table) -> Result<(), ImportError> {
    let missing: Vec<String> = CanonicalField::ALL
        .iter()
        .filter(|field| !table.has_column(field.as_str()))
        .map(|field| field.as_str().to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        tracing::error!("Upload is missing required columns: {:?}", missing);
        Err(ImportError::MissingColumns(missing))
    }
}
