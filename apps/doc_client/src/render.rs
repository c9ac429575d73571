use shared::domain::{Document, FIELD_DISPLAY_ID, FIELD_SIZE};

const HEADERS: [&str; 4] = ["DISPLAY ID", "ID", "SIZE (MB)", "DETAILS"];

/// Plain-text table of the document list, one row per document.
pub fn render_documents(documents: &[Document]) -> String {
    if documents.is_empty() {
        return "No documents found.\n".to_string();
    }

    let rows: Vec<[String; 4]> = documents.iter().map(row).collect();
    let mut widths = HEADERS.map(str::len);
    for cells in &rows {
        for (width, cell) in widths.iter_mut().zip(cells) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, &HEADERS.map(str::to_string), &widths);
    for cells in &rows {
        push_line(&mut out, cells, &widths);
    }
    out
}

fn row(document: &Document) -> [String; 4] {
    let details = document
        .fields
        .iter()
        .filter(|field| field.name != FIELD_DISPLAY_ID && field.name != FIELD_SIZE)
        .map(|field| format!("{}={}", field.name, field.value))
        .collect::<Vec<_>>()
        .join(", ");
    [
        document.display_id().unwrap_or("-").to_string(),
        document.id.to_string(),
        format!("{:.2}", document.file_size_mb()),
        details,
    ]
}

fn push_line(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    out.push_str(line.trim_end());
    out.push('\n');
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
