//! CSV-manifest-backed level store.
//!
//! The manifest has no header row. Each record is exactly three columns:
//!
//! ```text
//! name,path/to/level.dat,date string
//! ```
//!
//! The first record is the default level.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{LevelDescriptor, LevelError, LevelStore};

#[derive(Debug, Deserialize)]
struct ManifestRecord {
    name: String,
    path: String,
    date: String,
}

/// A fixed list of levels loaded from a manifest.
#[derive(Debug, Clone, Default)]
pub struct Museum {
    levels: Vec<LevelDescriptor>,
}

impl Museum {
    /// Creates a store over an explicit list of levels.
    pub fn new(levels: Vec<LevelDescriptor>) -> Self {
        Self { levels }
    }

    /// Loads the manifest at `path`.
    pub fn from_manifest(path: &Path) -> Result<Self, LevelError> {
        let file = std::fs::File::open(path)?;
        let museum = Self::from_reader(file)?;
        tracing::info!(
            manifest = %path.display(),
            levels = museum.levels.len(),
            "loaded level manifest"
        );
        Ok(museum)
    }

    /// Parses manifest CSV from any reader.
    ///
    /// # Errors
    /// - [`LevelError::CorruptManifest`] if a record isn't three columns
    /// - [`LevelError::Csv`] if the input isn't valid CSV
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LevelError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut levels = Vec::new();
        for (index, record) in csv.records().enumerate() {
            let record = record?;
            if record.len() != 3 {
                return Err(LevelError::CorruptManifest {
                    record: index + 1,
                    columns: record.len(),
                });
            }
            let entry: ManifestRecord = record.deserialize(None)?;
            levels.push(LevelDescriptor {
                name: entry.name,
                path: entry.path.into(),
                date: entry.date,
            });
        }

        Ok(Self::new(levels))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl LevelStore for Museum {
    fn list_names(&self) -> Vec<String> {
        self.levels.iter().map(|level| level.name.clone()).collect()
    }

    fn lookup(&self, name: &str) -> Result<LevelDescriptor, LevelError> {
        self.levels
            .iter()
            .find(|level| level.name == name)
            .cloned()
            .ok_or_else(|| LevelError::NotFound(name.to_string()))
    }

    fn default_level(&self) -> Result<LevelDescriptor, LevelError> {
        self.levels
            .first()
            .cloned()
            .ok_or_else(|| LevelError::NotFound("<default>".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\
Spawn,levels/spawn.dat,June 2009
Castle,levels/castle.dat,\"August 12, 2009\"
Pixel Art,levels/pixel.dat,2010
";

    #[test]
    fn test_parses_records_in_order() {
        let museum = Museum::from_reader(MANIFEST.as_bytes()).unwrap();
        assert_eq!(museum.len(), 3);
        assert_eq!(museum.list_names(), vec!["Spawn", "Castle", "Pixel Art"]);
    }

    #[test]
    fn test_quoted_fields() {
        let museum = Museum::from_reader(MANIFEST.as_bytes()).unwrap();
        let castle = museum.lookup("Castle").unwrap();
        assert_eq!(castle.date, "August 12, 2009");
        assert_eq!(castle.path, Path::new("levels/castle.dat"));
    }

    #[test]
    fn test_default_is_first_record() {
        let museum = Museum::from_reader(MANIFEST.as_bytes()).unwrap();
        assert_eq!(museum.default_level().unwrap().name, "Spawn");
    }

    #[test]
    fn test_lookup_miss() {
        let museum = Museum::from_reader(MANIFEST.as_bytes()).unwrap();
        let err = museum.lookup("spawn").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_empty_manifest_has_no_default() {
        let museum = Museum::from_reader(&b""[..]).unwrap();
        assert!(museum.is_empty());
        assert!(museum.default_level().unwrap_err().is_not_found());
    }

    #[test]
    fn test_wrong_column_count_is_corrupt() {
        let err = Museum::from_reader(&b"a,b,c\nd,e\n"[..]).unwrap_err();
        assert!(matches!(
            err,
            LevelError::CorruptManifest { record: 2, columns: 2 }
        ));
    }
}
