//! JSON file output
//!
//! Each brand is written to its own pretty-printed document:
//!
//! ```text
//! results_dir/
//! ├── ragno.json
//! └── fabresa.json
//! ```

use crate::model::Brand;
use crate::output::traits::{OutputResult, ResultSink};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes one `<brand name>.json` per brand into a directory
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path the given brand is written to
    pub fn path_for(&self, brand: &Brand) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(&brand.name)))
    }
}

impl ResultSink for JsonFileSink {
    fn persist(&self, brand: &Brand) -> OutputResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path_for(brand);
        let mut json = serde_json::to_string_pretty(brand)?;
        json.push('\n');

        let mut file = File::create(&path)?;
        file.write_all(json.as_bytes())?;

        tracing::info!("Wrote {} to {}", brand.name, path.display());
        Ok(())
    }
}

/// Lowercased brand name with path separators replaced
fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => "brand".to_string(),
        _ => stem,
    }
}
