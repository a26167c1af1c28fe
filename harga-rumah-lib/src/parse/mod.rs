use regex::Regex;

use crate::error::ImportState;
use crate::schema::CanonicalField;
use crate::table::Table;

/// Derives `provinsi`, `kota`, and `kecamatan` from the free-text `lokasi`
/// column. The split is a heuristic: first whitespace token is the province,
/// second is the city (with any parenthetical stripped), and the first
/// parenthetical anywhere in the string is the district. Non-conforming
/// rows degrade to missing sub-fields instead of failing the batch.
pub struct LocationParser {
    parenthetical: Regex,
    inner: Regex,
}

impl Default for LocationParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationParser {
    pub fn new() -> Self {
        Self {
            parenthetical: Regex::new(r"\(.*\)").unwrap(),
            inner: Regex::new(r"\((.*?)\)").unwrap(),
        }
    }

    pub fn parse_location(&self, table: &mut Table, state: &mut ImportState) {
        let Some(lokasi_idx) = table.column_index(CanonicalField::Lokasi.as_str()) else {
            return;
        };

        let mut provinsi = Vec::with_capacity(table.len());
        let mut kota = Vec::with_capacity(table.len());
        let mut kecamatan = Vec::with_capacity(table.len());

        for (row_idx, row) in table.rows().iter().enumerate() {
            match &row[lokasi_idx] {
                Some(raw) => {
                    let mut tokens = raw.split_whitespace();
                    let province = tokens.next().map(str::to_string);
                    let city = tokens
                        .next()
                        .map(|token| self.parenthetical.replace_all(token, "").into_owned());
                    let district = self
                        .inner
                        .captures(raw)
                        .map(|captures| captures[1].to_string());

                    if province.is_none() || city.is_none() {
                        let message = format!(
                            "Location '{}' has fewer than two tokens (row {}); leaving derived fields empty",
                            raw, row_idx
                        );
                        tracing::warn!("{}", message);
                        state.add_warning(message, Some("parse_location".to_string()));
                    }

                    provinsi.push(province);
                    kota.push(city);
                    kecamatan.push(district);
                }
                None => {
                    provinsi.push(None);
                    kota.push(None);
                    kecamatan.push(None);
                }
            }
        }

        // Column lengths match the row count, so these cannot fail.
        table.add_column("provinsi", provinsi).unwrap();
        table.add_column("kota", kota).unwrap();
        table.add_column("kecamatan", kecamatan).unwrap();
    }
}

/// Strips grouping separators from the `harga` column and coerces it to an
/// integer rendering. Both `.` and `,` are thousands separators in this
/// domain, never decimal points. Coercion is all-or-nothing across the
/// column: one bad cell leaves the whole column unmodified with a warning.
pub fn clean_price(table: &mut Table, state: &mut ImportState) {
    let Some(harga_idx) = table.column_index(CanonicalField::Harga.as_str()) else {
        return;
    };

    let mut cleaned = Vec::with_capacity(table.len());
    for row in table.rows() {
        match &row[harga_idx] {
            Some(raw) => {
                let stripped: String = raw
                    .chars()
                    .filter(|c| *c != '.' && *c != ',')
                    .collect();
                match stripped.trim().parse::<i64>() {
                    Ok(value) => cleaned.push(Some(value.to_string())),
                    Err(_) => {
                        let message =
                            format!("Could not coerce harga value '{}'; column left as-is", raw);
                        tracing::warn!("{}", message);
                        state.add_warning(message, Some("clean_price".to_string()));
                        return;
                    }
                }
            }
            None => cleaned.push(None),
        }
    }

    table.set_column(harga_idx, cleaned);
}
