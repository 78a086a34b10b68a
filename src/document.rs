//! JSON document I/O for pose sequences and swing reports.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

/// Errors reading or writing a JSON document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read and parse a JSON file.
pub fn read_json(path: &Path) -> Result<Value, DocumentError> {
    let contents = fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Write a value as pretty-printed JSON, creating parent directories.
pub fn write_json(path: &Path, value: &Value) -> Result<(), DocumentError> {
    let io_err = |source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut contents = serde_json::to_string_pretty(value).map_err(|source| DocumentError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    contents.push('\n');
    fs::write(path, contents).map_err(io_err)
}

/// Remove every `frames` key, at any depth.
///
/// Ranked reports are kept for their narrative and metrics; raw pose frames
/// can be orders of magnitude larger.
pub fn strip_frames(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| key.as_str() != "frames")
                .map(|(key, v)| (key.clone(), strip_frames(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_frames).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_frames_is_deep() {
        let doc = json!({
            "frames": [1, 2],
            "narrative": {"frames": [], "text": "ok"},
            "clips": [{"frames": [3], "id": 1}]
        });
        assert_eq!(
            strip_frames(&doc),
            json!({"narrative": {"text": "ok"}, "clips": [{"id": 1}]})
        );
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");
        let doc = json!({"frames": [{"landmarks": []}]});
        write_json(&path, &doc).unwrap();
        assert_eq!(read_json(&path).unwrap(), doc);
    }

    #[test]
    fn read_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        let err = read_json(&path).unwrap_err();
        assert!(matches!(err, DocumentError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));

        let missing = read_json(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, DocumentError::Io { .. }));
    }
}
