//! Grouped series over clean records, consumed by the dashboard
//! collaborator for its charts. Rendering stays out of this crate.

use std::collections::BTreeMap;

use crate::record::CleanRecord;

/// Historical records for one province/city selection.
pub fn filter_by_area<'a>(
    records: &'a [CleanRecord],
    provinsi: &str,
    kota: &str,
) -> Vec<&'a CleanRecord> {
    records
        .iter()
        .filter(|record| {
            record.provinsi.as_deref() == Some(provinsi) && record.kota.as_deref() == Some(kota)
        })
        .collect()
}

/// Mean price per build year, sorted by year.
pub fn mean_price_by_year(records: &[&CleanRecord]) -> Vec<(i64, f64)> {
    mean_price_by(records, |record| record.tahun_bangun)
}

/// Mean price per bedroom count, sorted by count.
pub fn mean_price_by_bedrooms(records: &[&CleanRecord]) -> Vec<(i64, f64)> {
    mean_price_by(records, |record| record.kamar_tidur)
}

fn mean_price_by<F>(records: &[&CleanRecord], key: F) -> Vec<(i64, f64)>
where
    F: Fn(&CleanRecord) -> i64,
{
    let mut groups: BTreeMap<i64, (i64, usize)> = BTreeMap::new();
    for record in records {
        let entry = groups.entry(key(record)).or_insert((0, 0));
        entry.0 += record.harga;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(group, (total, count))| (group, total as f64 / count as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(provinsi: &str, kota: &str, tahun: i64, kamar: i64, harga: i64) -> CleanRecord {
        CleanRecord {
            luas_meter2: 100.0,
            kamar_tidur: kamar,
            kamar_mandi: 1,
            jarak_ke_kota: 5.0,
            tahun_bangun: tahun,
            lokasi: format!("{provinsi} {kota}"),
            harga,
            provinsi: Some(provinsi.to_string()),
            kota: Some(kota.to_string()),
            kecamatan: None,
        }
    }

    #[test]
    fn area_filter_matches_both_fields() {
        let records = vec![
            record("Jawa", "Barat", 2010, 2, 100),
            record("Jawa", "Timur", 2010, 2, 200),
            record("DKI", "Jakarta", 2012, 3, 300),
        ];
        let filtered = filter_by_area(&records, "Jawa", "Barat");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].harga, 100);
    }

    #[test]
    fn mean_price_groups_and_sorts_by_year() {
        let records = vec![
            record("Jawa", "Barat", 2012, 2, 300),
            record("Jawa", "Barat", 2010, 2, 100),
            record("Jawa", "Barat", 2010, 3, 200),
        ];
        let refs: Vec<&CleanRecord> = records.iter().collect();
        assert_eq!(
            mean_price_by_year(&refs),
            vec![(2010, 150.0), (2012, 300.0)]
        );
    }

    #[test]
    fn mean_price_groups_by_bedrooms() {
        let records = vec![
            record("Jawa", "Barat", 2012, 2, 300),
            record("Jawa", "Barat", 2010, 2, 100),
            record("Jawa", "Barat", 2010, 3, 200),
        ];
        let refs: Vec<&CleanRecord> = records.iter().collect();
        assert_eq!(
            mean_price_by_bedrooms(&refs),
            vec![(2, 200.0), (3, 200.0)]
        );
    }
}
