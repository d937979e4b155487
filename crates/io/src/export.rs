// Selected-output table export - CSV and JSON

use std::path::Path;

use aquion_engine::cell::CellValue;
use aquion_engine::table::SelectedOutput;

/// Export the whole table as comma-separated text, header row first.
/// Cells render with their display form (reals keep full round-trip
/// precision here, unlike punch files).
pub fn export_csv(table: &SelectedOutput, path: &Path) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| e.to_string())?;

    for row in table.rows() {
        let record: Vec<String> = row.iter().map(|cell| cell.display_string()).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }

    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

/// Export the table as a JSON object with `headings` and `rows`.
///
/// Cells map to natural JSON: text to strings, numbers to numbers, empty
/// cells to null, error cells to an object carrying the numeric code.
pub fn export_json(table: &SelectedOutput, path: &Path) -> Result<(), String> {
    let headings: Vec<serde_json::Value> = table
        .row(0)
        .map(|header| {
            header
                .iter()
                .map(|cell| serde_json::Value::String(cell.display_string()))
                .collect()
        })
        .unwrap_or_default();

    let rows: Vec<serde_json::Value> = table
        .rows()
        .skip(1)
        .map(|row| serde_json::Value::Array(row.iter().map(cell_json).collect()))
        .collect();

    let doc = serde_json::json!({
        "headings": headings,
        "rows": rows,
    });

    let file = std::fs::File::create(path).map_err(|e| e.to_string())?;
    serde_json::to_writer_pretty(file, &doc).map_err(|e| e.to_string())?;
    Ok(())
}

fn cell_json(cell: &CellValue) -> serde_json::Value {
    match cell {
        CellValue::Empty => serde_json::Value::Null,
        CellValue::Error(e) => serde_json::json!({ "error": e.code() }),
        CellValue::Text(s) => serde_json::json!(s),
        CellValue::Real(r) => serde_json::json!(r),
        CellValue::Integer(i) => serde_json::json!(i),
    }
}
