//! Integration tests for the `tables` subcommand.

use assert_cmd::Command;
use predicates::prelude::*;

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

fn pdf_file(dir: &tempfile::TempDir, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join("report.pdf");
    std::fs::write(&path, pdf_with_content(content)).unwrap();
    path
}

#[test]
fn tables_prints_lattice_grid_as_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_file(&dir, &ruled_table(&["pH", "TDS"], &["7.2", "350"]));

    cmd()
        .arg("tables")
        .arg(&path)
        .assert()
        .success()
        .stdout("pH,TDS\n7.2,350\n");
}

#[test]
fn tables_json_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_file(&dir, &ruled_table(&["pH", "TDS"], &["7.2", "350"]));

    let output = cmd()
        .arg("tables")
        .arg(&path)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let tables = json.as_array().unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0]["strategy"], "lattice");
    assert_eq!(tables[0]["header"], true);
    assert_eq!(tables[0]["rows"][1][0], "7.2");
}

#[test]
fn tables_with_text_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_file(&dir, &ruled_table(&["pH", "TDS"], &["7.2", "350"]));

    cmd()
        .arg("tables")
        .arg(&path)
        .args(["--strategy", "text"])
        .assert()
        .success()
        .stdout("pH,TDS\n7.2,350\n");
}

#[test]
fn tables_none_found() {
    let dir = tempfile::tempdir().unwrap();
    let path = pdf_file(&dir, b"BT ET");

    cmd()
        .arg("tables")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("No tables found."));
}

#[test]
fn tables_missing_file() {
    cmd()
        .args(["tables", "/nonexistent/report.pdf"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("file not found"));
}

#[test]
fn tables_invalid_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.pdf");
    std::fs::write(&path, b"not a pdf").unwrap();

    cmd()
        .arg("tables")
        .arg(&path)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}
