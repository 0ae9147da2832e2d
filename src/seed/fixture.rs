//! Fixture file reading.

use std::path::Path;

use serde_json::Value;

use crate::error::FixtureError;

/// Read a fixture file and return its top-level array elements.
pub async fn read_fixture(path: &Path) -> Result<Vec<Value>, FixtureError> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(FixtureError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(FixtureError::Io(e)),
    };
    parse_fixture(&text)
}

/// Parse fixture text. Anything but a top-level array is rejected.
pub fn parse_fixture(text: &str) -> Result<Vec<Value>, FixtureError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(rows) => Ok(rows),
        _ => Err(FixtureError::NotArray),
    }
}
