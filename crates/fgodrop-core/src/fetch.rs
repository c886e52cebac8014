//! Fetching the raw cell grid
//!
//! The grid comes either from the Sheets values API or from a CSV export
//! on disk. Both paths produce the same shape: a sequence of rows, each an
//! ordered sequence of string cells, ragged where the source dropped
//! trailing empties.

use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use url::Url;

/// Base endpoint of the Sheets values API
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    /// Absent when the requested range is empty
    #[serde(default)]
    values: Vec<Vec<Value>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: Option<i64>,
    message: String,
}

/// Fetch the cell grid for one spreadsheet range.
///
/// The API reports failures as a JSON error payload, often alongside a
/// non-2xx status; the payload's message is surfaced rather than the bare
/// status line.
pub fn fetch_values(
    client: &Client,
    spreadsheet_id: &str,
    range: &str,
    api_key: &str,
) -> Result<Vec<Vec<String>>> {
    let mut url =
        Url::parse(SHEETS_API).map_err(|e| Error::Config(format!("bad API endpoint: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| Error::Config("bad API endpoint".to_string()))?
        .push(spreadsheet_id)
        .push("values")
        .push(range);
    url.query_pairs_mut().append_pair("key", api_key);

    let response: ValuesResponse = client.get(url).send()?.json()?;
    if let Some(api_error) = response.error {
        return Err(Error::Sheets(match api_error.code {
            Some(code) => format!("{} (code {})", api_error.message, code),
            None => api_error.message,
        }));
    }
    Ok(response
        .values
        .into_iter()
        .map(|row| row.into_iter().map(render_cell).collect())
        .collect())
}

/// Render one JSON cell to the string form the transform consumes
fn render_cell(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Read the same grid shape from a CSV export of the sheet
pub fn values_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true) // banner and header rows have fewer cells
        .from_reader(BufReader::new(file));

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::Csv {
            context: path.display().to_string(),
            source: e,
        })?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_cell_types() {
        assert_eq!(render_cell(Value::String("冬木".to_string())), "冬木");
        assert_eq!(render_cell(Value::Null), "");
        assert_eq!(render_cell(serde_json::json!(1.5)), "1.5");
        assert_eq!(render_cell(serde_json::json!(1400)), "1400");
        assert_eq!(render_cell(Value::Bool(true)), "true");
    }

    #[test]
    fn test_values_response_with_grid() {
        let body = r#"{"range":"'ドロップ率表'!A1:Z9","majorDimension":"ROWS","values":[["エリア","AP"],["冬木",5]]}"#;
        let response: ValuesResponse = serde_json::from_str(body).unwrap();
        assert!(response.error.is_none());
        assert_eq!(response.values.len(), 2);
    }

    #[test]
    fn test_values_response_with_error_payload() {
        let body = r#"{"error":{"code":403,"message":"The request is missing a valid API key.","status":"PERMISSION_DENIED"}}"#;
        let response: ValuesResponse = serde_json::from_str(body).unwrap();
        let api_error = response.error.unwrap();
        assert_eq!(api_error.code, Some(403));
        assert!(api_error.message.contains("API key"));
        assert!(response.values.is_empty());
    }

    #[test]
    fn test_values_from_csv_keeps_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.csv");
        std::fs::write(&path, "ドロップ率表\nエリア,クエスト名,AP\n,,\n冬木,未確認座標X,5\n")
            .unwrap();

        let values = values_from_csv(&path).unwrap();
        assert_eq!(values.len(), 4);
        assert_eq!(values[0], vec!["ドロップ率表"]);
        assert_eq!(values[3], vec!["冬木", "未確認座標X", "5"]);
    }

    #[test]
    fn test_values_from_csv_missing_file() {
        let err = values_from_csv("/no/such/grid.csv").unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
