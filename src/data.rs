use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Loads template data from a JSON file, or YAML for any other extension.
pub fn load_data(path: &Path) -> Result<Value> {
    let data = fs::read(path).with_context(|| format!("reading data {}", path.display()))?;
    if path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
    {
        serde_json::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
    } else {
        serde_yaml::from_slice(&data).with_context(|| format!("parsing {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn json_by_extension() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("data.JSON");
        fs::write(&path, r#"{"num": "1"}"#).expect("write data");

        assert_eq!(load_data(&path).unwrap()["num"], "1");
    }

    #[test]
    fn yaml_otherwise() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("data.yml");
        fs::write(&path, "title: Fix parser\nitems:\n  - one\n  - two\n").expect("write data");

        let value = load_data(&path).unwrap();
        assert_eq!(value["title"], "Fix parser");
        assert_eq!(value["items"][1], "two");
    }

    #[test]
    fn malformed_data_names_the_file() {
        let temp = tempdir().expect("temp dir");
        let path = temp.path().join("broken.json");
        fs::write(&path, "{").expect("write data");

        let err = load_data(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }
}
