use crate::photokeep_core::error::{PhotokeepError, Result};
use exiftool::ExifTool;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Wrapper around the persistent exiftool subprocess, exposing metadata as
/// a flat string-keyed map with group-prefixed keys (`EXIF:DateTimeOriginal`).
///
/// The subprocess is spawned on first use, so modes that never consult
/// metadata do not require exiftool to be installed.
pub struct MetadataReader {
    tool: Option<ExifTool>,
}

impl MetadataReader {
    pub fn new() -> Self {
        MetadataReader { tool: None }
    }

    /// Read the metadata map for one file. Scalar values are stringified;
    /// composite values (arrays, objects) are dropped.
    pub fn extract_metadata(&mut self, path: &Path) -> Result<HashMap<String, String>> {
        let tool = match &mut self.tool {
            Some(tool) => tool,
            slot @ None => {
                let spawned =
                    ExifTool::new().map_err(|e| PhotokeepError::Exiftool(e.to_string()))?;
                slot.insert(spawned)
            }
        };

        let raw: Value = tool
            .read_metadata(path, &["-G", "-n"])
            .map_err(|e| PhotokeepError::Exiftool(e.to_string()))?;

        Ok(flatten_metadata(raw))
    }
}

impl Default for MetadataReader {
    fn default() -> Self {
        Self::new()
    }
}

fn flatten_metadata(raw: Value) -> HashMap<String, String> {
    let mut map = HashMap::new();
    if let Value::Object(fields) = raw {
        for (key, value) in fields {
            let rendered = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => continue,
            };
            map.insert(key, rendered);
        }
    }
    map
}
