use std::fs;
use std::path::Path;
use std::process::Command;

const UPLOAD: &str = "area,kamar,toilet,jarak,tahun,alamat,price\n\
    120,3,2,4.5,2015,Jawa Barat Bandung (Cimahi),1.250.000\n";

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_harga-rumah"))
        .args(args)
        .output()
        .expect("failed to run harga-rumah binary")
}

fn row_count(path: &Path) -> usize {
    let contents = fs::read_to_string(path).expect("store file should exist");
    contents.lines().count().saturating_sub(1)
}

#[test]
fn import_persists_and_reupload_does_not_grow_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let upload_path = dir.path().join("listing.csv");
    fs::write(&upload_path, UPLOAD).unwrap();
    let data_dir = dir.path().join("data");

    let output = run(&[
        "import",
        "--file",
        upload_path.to_str().unwrap(),
        "--data-dir",
        data_dir.to_str().unwrap(),
    ]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let raw_store = data_dir.join("raw_dataset.csv");
    let clean_store = data_dir.join("cleaned_dataset.csv");
    assert_eq!(row_count(&raw_store), 1);
    assert_eq!(row_count(&clean_store), 1);

    let output = run(&[
        "import",
        "--file",
        upload_path.to_str().unwrap(),
        "--data-dir",
        data_dir.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert_eq!(row_count(&raw_store), 1);
}

#[test]
fn validate_reports_missing_columns_without_writing_stores() {
    let dir = tempfile::tempdir().unwrap();
    let upload_path = dir.path().join("incomplete.csv");
    fs::write(
        &upload_path,
        "area,kamar,jarak,tahun,alamat,price\n120,3,4.5,2015,DKI Jakarta,900000\n",
    )
    .unwrap();

    let output = run(&["validate", "--file", upload_path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("kamar_mandi"), "stderr: {stderr}");
}

#[test]
fn unsupported_format_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let upload_path = dir.path().join("listing.parquet");
    fs::write(&upload_path, "not a table").unwrap();

    let output = run(&["import", "--file", upload_path.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parquet"), "stderr: {stderr}");
}

#[test]
fn mapping_lists_the_builtin_aliases() {
    let output = run(&["mapping"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("alamat"));
    assert!(stdout.contains("lokasi"));
    assert!(stdout.contains("harga_rumah"));
}
