pub mod compile;
pub mod init;
pub mod normalize;

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use std::path::Path;

/// Read a JSON document from `path`, or stdin when `path` is absent or `-`.
pub fn read_json_input(path: Option<&Path>) -> Result<Value> {
    let raw = match path {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
        }
        _ => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read intent from stdin")?;
            buffer
        }
    };
    let label = path.map(|p| p.display().to_string()).unwrap_or_else(|| "stdin".to_string());
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON from {label}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reads_json_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("intent.json");
        std::fs::write(&path, r#"{"q": "acme"}"#).unwrap();
        let value = read_json_input(Some(&path)).unwrap();
        assert_eq!(value["q"], "acme");
    }

    #[test]
    fn reports_file_in_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.json");
        std::fs::write(&path, "{").unwrap();
        let err = read_json_input(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("broken.json"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(read_json_input(Some(&temp.path().join("absent.json"))).is_err());
    }
}
