//! Integration tests for the `merge` subcommand.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn cmd() -> Command {
    Command::cargo_bin("pdfsheet").unwrap()
}

/// Create a single-page PDF with the given content stream.
fn pdf_with_content(content: &[u8]) -> Vec<u8> {
    use lopdf::{Object, Stream, dictionary};

    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let stream = Stream::new(dictionary! {}, content.to_vec());
    let content_id = doc.add_object(stream);

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    };

    let media_box = vec![
        Object::Integer(0),
        Object::Integer(0),
        Object::Integer(612),
        Object::Integer(792),
    ];
    let page_dict = dictionary! {
        "Type" => "Page",
        "MediaBox" => media_box,
        "Contents" => Object::Reference(content_id),
        "Resources" => resources,
    };
    let page_id = doc.add_object(page_dict);

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    };
    let pages_id = doc.add_object(pages_dict);

    if let Ok(page_obj) = doc.get_object_mut(page_id) {
        if let Ok(dict) = page_obj.as_dict_mut() {
            dict.set("Parent", Object::Reference(pages_id));
        }
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// A ruled grid: header row above one data row, 100pt wide cells.
fn ruled_table(header: &[&str], row: &[&str]) -> Vec<u8> {
    let right = 50 + 100 * header.len();
    let mut content = String::from("1 w\n");
    for y in [700, 680, 660] {
        content.push_str(&format!("50 {y} m {right} {y} l S\n"));
    }
    for col in 0..=header.len() {
        let x = 50 + 100 * col;
        content.push_str(&format!("{x} 700 m {x} 660 l S\n"));
    }
    for (baseline, cells) in [(685, header), (665, row)] {
        for (col, text) in cells.iter().enumerate() {
            let x = 55 + 100 * col;
            content.push_str(&format!("BT /F1 10 Tf {x} {baseline} Td ({text}) Tj ET\n"));
        }
    }
    content.into_bytes()
}

fn write_pdf(dir: &Path, name: &str, content: &[u8]) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), pdf_with_content(content)).unwrap();
}

fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

const EXPECTED_2021: &str = "Turbidity,Temperature,Year\n3.2,25.1,2021\n";

#[test]
fn merge_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(
        &dir.path().join("PDF"),
        "Report2021.pdf",
        &ruled_table(&["Turbidity", "Temperature", "X"], &["3.2", "25.1", "abc"]),
    );

    cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Saved merged dataset: merged_dataset.csv (1 rows)",
        ))
        .stdout(predicate::str::contains("PDFs failed").not());

    assert_eq!(
        read(dir.path().join("temp_csvs").join("Report2021_2021_0.csv")),
        EXPECTED_2021
    );
    assert_eq!(read(dir.path().join("merged_dataset.csv")), EXPECTED_2021);
    assert!(!dir.path().join("extraction_log.txt").exists());
}

#[test]
fn merge_with_explicit_paths() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("reports");
    write_pdf(
        &input,
        "plant_2019.pdf",
        &ruled_table(&["pH", "TDS"], &["7.1", "410"]),
    );
    write_pdf(
        &input,
        "plant_2020.pdf",
        &ruled_table(&["TDS", "Turbidity"], &["380", "1.5"]),
    );
    let output = dir.path().join("all.csv");

    cmd()
        .arg("merge")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .arg("--intermediate-dir")
        .arg(dir.path().join("tables"))
        .arg("--log-file")
        .arg(dir.path().join("errors.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("(2 rows)"));

    assert_eq!(
        read(&output),
        "pH,TDS,Year,Turbidity\n7.1,410,2019,\n,380,2020,1.5\n"
    );
    assert_eq!(
        read(dir.path().join("tables").join("plant_2020_2020_0.csv")),
        "Turbidity,TDS,Year\n1.5,380,2020\n"
    );
}

#[test]
fn document_without_content_fails() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(&dir.path().join("PDF"), "scan2018.pdf", b"BT ET");

    cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .success()
        .stdout(predicate::str::contains("No valid data extracted from PDFs."))
        .stdout(predicate::str::contains("PDFs failed:\n  - scan2018.pdf"));

    let temp_files = std::fs::read_dir(dir.path().join("temp_csvs")).unwrap().count();
    assert_eq!(temp_files, 0);
    assert!(!dir.path().join("merged_dataset.csv").exists());

    let log = read(dir.path().join("extraction_log.txt"));
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 1);
    let pattern =
        regex::Regex::new(r"^\[\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}\] Failed scan2018\.pdf: .+$")
            .unwrap();
    assert!(pattern.is_match(lines[0]), "unexpected log line: {}", lines[0]);
}

#[test]
fn corrupt_document_does_not_stop_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PDF");
    write_pdf(
        &input,
        "b_2022.pdf",
        &ruled_table(&["pH"], &["6.9"]),
    );
    std::fs::write(input.join("a_2021.pdf"), b"%PDF-1.5 garbage").unwrap();

    cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .success()
        .stdout(predicate::str::contains("  - a_2021.pdf"))
        .stdout(predicate::str::contains("(1 rows)"));

    assert_eq!(read(dir.path().join("merged_dataset.csv")), "pH,Year\n6.9,2022\n");
    assert!(read(dir.path().join("extraction_log.txt")).contains("Failed a_2021.pdf"));
}

#[test]
fn text_fallback_columns_are_positional() {
    let dir = tempfile::tempdir().unwrap();
    let content = b"
        BT /F1 10 Tf 72 700 Td (site 7.5 12) Tj ET
        BT /F1 10 Tf 72 680 Td (well 8.1) Tj ET
    ";
    write_pdf(&dir.path().join("PDF"), "notes.pdf", content);

    cmd()
        .current_dir(dir.path())
        .arg("merge")
        .assert()
        .success();

    assert_eq!(
        read(dir.path().join("temp_csvs").join("notes_Unknown_0.csv")),
        "0,1,2,Year\n,7.5,12,Unknown\n,8.1,,Unknown\n"
    );
}

#[test]
fn rerun_rewrites_identical_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("PDF");
    write_pdf(
        &input,
        "Report2021.pdf",
        &ruled_table(&["Turbidity", "Temperature", "X"], &["3.2", "25.1", "abc"]),
    );
    write_pdf(&input, "blank.pdf", b"BT ET");

    cmd().current_dir(dir.path()).arg("merge").assert().success();
    let merged = read(dir.path().join("merged_dataset.csv"));
    let log_lines = read(dir.path().join("extraction_log.txt")).lines().count();

    cmd().current_dir(dir.path()).arg("merge").assert().success();

    assert_eq!(read(dir.path().join("merged_dataset.csv")), merged);
    assert_eq!(
        read(dir.path().join("temp_csvs").join("Report2021_2021_0.csv")),
        EXPECTED_2021
    );
    assert_eq!(
        read(dir.path().join("extraction_log.txt")).lines().count(),
        log_lines * 2
    );
}

#[test]
fn config_file_and_flags_are_layered() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(
        &dir.path().join("in"),
        "r2020.pdf",
        &ruled_table(&["pH", "TDS"], &["7.0", "300"]),
    );
    std::fs::write(
        dir.path().join("pdfsheet.toml"),
        "input_dir = \"in\"\noutput = \"from_file.csv\"\ntarget_columns = [\"TDS\"]\n",
    )
    .unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["merge", "--config", "pdfsheet.toml", "--output", "from_flag.csv"])
        .assert()
        .success();

    assert!(!dir.path().join("from_file.csv").exists());
    assert_eq!(read(dir.path().join("from_flag.csv")), "TDS,Year\n300,2020\n");
}

#[test]
fn target_column_flag_restricts_columns() {
    let dir = tempfile::tempdir().unwrap();
    write_pdf(
        &dir.path().join("PDF"),
        "r2020.pdf",
        &ruled_table(&["pH", "TDS"], &["7.0", "300"]),
    );

    cmd()
        .current_dir(dir.path())
        .args(["merge", "--target-col", "pH"])
        .assert()
        .success();

    assert_eq!(read(dir.path().join("merged_dataset.csv")), "pH,Year\n7,2020\n");
}

#[test]
fn missing_input_directory_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["merge", "no_such_dir"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to read input directory"));
}

#[test]
fn invalid_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("bad.toml"), "strategies = [\"ocr\"]\n").unwrap();

    cmd()
        .current_dir(dir.path())
        .args(["merge", "--config", "bad.toml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn unknown_strategy_is_a_usage_error() {
    cmd()
        .args(["merge", "--strategy", "ocr"])
        .assert()
        .failure()
        .code(2);
}
