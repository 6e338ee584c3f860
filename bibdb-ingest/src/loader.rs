//! Batch file loader
//!
//! Reads harvested records from disk into [`RawRecord`] mappings. The file
//! extension selects the format:
//! - `.json`: an array of objects, `{"entries": [...]}`, or a Scopus search
//!   response `{"search-results": {"entry": [...]}}`
//! - `.jsonl`: one object per line, blank lines ignored
//! - `.csv`: header row gives the keys; empty cells are left out

use crate::error::{IngestError, IngestResult};
use crate::models::RawRecord;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Load every record of a batch file
pub fn load_records(path: &Path) -> IngestResult<Vec<RawRecord>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let records = match extension.as_str() {
        "json" => parse_json(&read_file(path)?)?,
        "jsonl" | "ndjson" => parse_json_lines(&read_file(path)?)?,
        "csv" => parse_csv(path)?,
        other => {
            return Err(IngestError::Load(format!(
                "{}: unsupported file type '{}' (expected json, jsonl or csv)",
                path.display(),
                other
            )))
        }
    };

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn read_file(path: &Path) -> IngestResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| IngestError::Load(format!("{}: {}", path.display(), e)))
}

/// Parse a JSON document holding a list of records
pub fn parse_json(content: &str) -> IngestResult<Vec<RawRecord>> {
    let document: Value = serde_json::from_str(content)
        .map_err(|e| IngestError::Load(format!("invalid JSON: {}", e)))?;

    let entries = match document {
        Value::Array(items) => items,
        Value::Object(mut root) => {
            let nested = root
                .get_mut("search-results")
                .and_then(|results| results.get_mut("entry"))
                .map(Value::take);

            match nested.or_else(|| root.remove("entries")) {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(IngestError::Load(
                        "JSON object has no 'entries' or 'search-results.entry' list".to_string(),
                    ))
                }
            }
        }
        _ => return Err(IngestError::Load("JSON document is not a list of records".to_string())),
    };

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| into_record(entry, index + 1))
        .collect()
}

/// Parse newline-delimited JSON objects
pub fn parse_json_lines(content: &str) -> IngestResult<Vec<RawRecord>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            let value: Value = serde_json::from_str(line)
                .map_err(|e| IngestError::Load(format!("line {}: {}", index + 1, e)))?;
            into_record(value, index + 1)
        })
        .collect()
}

fn into_record(value: Value, position: usize) -> IngestResult<RawRecord> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(IngestError::Load(format!("record {} is not an object", position))),
    }
}

fn parse_csv(path: &Path) -> IngestResult<Vec<RawRecord>> {
    let reader = csv::Reader::from_path(path)
        .map_err(|e| IngestError::Load(format!("{}: {}", path.display(), e)))?;
    read_csv(reader)
}

/// Read CSV rows, using the header row as keys
pub fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> IngestResult<Vec<RawRecord>> {
    let headers = reader
        .headers()
        .map_err(|e| IngestError::Load(format!("CSV header: {}", e)))?
        .clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| IngestError::Load(format!("CSV row: {}", e)))?;

        let record: RawRecord = headers
            .iter()
            .zip(row.iter())
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(key, cell)| (key.to_string(), Value::String(cell.to_string())))
            .collect();
        records.push(record);
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_json_array() {
        let records = parse_json(r#"[{"arxiv_id": "1"}, {"arxiv_id": "2"}]"#).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["arxiv_id"], "2");
    }

    #[test]
    fn test_json_wrapped_lists() {
        let entries = parse_json(r#"{"entries": [{"id": "a"}]}"#).unwrap();
        assert_eq!(entries.len(), 1);

        let scopus = parse_json(
            r#"{"search-results": {"opensearch:totalResults": "2", "entry": [{"eid": "x"}, {"eid": "y"}]}}"#,
        )
        .unwrap();
        assert_eq!(scopus.len(), 2);
        assert_eq!(scopus[0]["eid"], "x");
    }

    #[test]
    fn test_json_rejects_non_objects() {
        assert!(matches!(parse_json(r#"[1, 2]"#), Err(IngestError::Load(_))));
        assert!(matches!(parse_json(r#"{"other": []}"#), Err(IngestError::Load(_))));
        assert!(matches!(parse_json("not json"), Err(IngestError::Load(_))));
    }

    #[test]
    fn test_json_lines_skip_blank() {
        let records = parse_json_lines("{\"id\": \"1\"}\n\n{\"id\": \"2\"}\n").unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_csv_empty_cells_absent() {
        let data = "arxiv_id,title,doi\n2401.1,First,\n2401.2,Second,10.1/x\n";
        let records = read_csv(csv::Reader::from_reader(data.as_bytes())).unwrap();

        assert_eq!(records.len(), 2);
        assert!(!records[0].contains_key("doi"));
        assert_eq!(records[1]["doi"], "10.1/x");
    }

    #[test]
    fn test_load_by_extension() {
        let mut file = Builder::new().suffix(".jsonl").tempfile().unwrap();
        writeln!(file, "{{\"arxiv_id\": \"9\"}}").unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 1);

        let unsupported = Builder::new().suffix(".xml").tempfile().unwrap();
        assert!(matches!(load_records(unsupported.path()), Err(IngestError::Load(_))));
    }
}
