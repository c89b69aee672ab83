//! In-memory PDFs for unit tests.

use lopdf::{Dictionary, Object, Stream, dictionary};

/// A single-page Letter PDF with Helvetica as `/F1`.
pub fn pdf_with_content(content: &[u8]) -> Vec<u8> {
    let helvetica = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    };
    pdf_with_page(content, &[0, 0, 612, 792], helvetica)
}

/// A single-page PDF with the given MediaBox entries and `font` as `/F1`.
pub fn pdf_with_page(content: &[u8], media_box: &[i64], font: Dictionary) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(font);

    let stream = Stream::new(dictionary! {}, content.to_vec());
    let content_id = doc.add_object(stream);

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => Object::Reference(font_id),
        },
    };

    let media_box: Vec<Object> = media_box.iter().copied().map(Object::Integer).collect();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => media_box,
        "Contents" => Object::Reference(content_id),
        "Resources" => resources,
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => Object::Integer(1),
    });

    if let Ok(dict) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
        dict.set("Parent", Object::Reference(pages_id));
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

/// Content stream for a two-row grid of 100pt wide cells: `header` above
/// `row`, each cell ruled on all sides.
pub fn ruled_table(header: &[&str], row: &[&str]) -> Vec<u8> {
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

/// Content stream with one line of text per entry, 20pt apart.
pub fn text_lines(lines: &[&str]) -> Vec<u8> {
    let mut content = String::new();
    for (i, line) in lines.iter().enumerate() {
        let y = 700 - 20 * i;
        content.push_str(&format!("BT /F1 10 Tf 72 {y} Td ({line}) Tj ET\n"));
    }
    content.into_bytes()
}
