//! Animation descriptor loading.
//!
//! A descriptor directory holds one JSON file per sheet, each naming the
//! image asset, its tile grid, optional overlay images, and the sheet's
//! frame sequences:
//!
//! ```json
//! {
//!   "key": "transport-belt",
//!   "assetFile": "entity/transport-belt/transport-belt.png",
//!   "spriteCountX": 16,
//!   "spriteCountY": 20,
//!   "assetShadowFile": "entity/transport-belt/shadow.png",
//!   "frameSequences": {
//!     "run": { "secondsPerFrame": 0.05, "frames": [0, 1, 2, 3] }
//!   }
//! }
//! ```

use std::path::Path;

use ahash::AHashMap;
use serde::Deserialize;

use super::animation::FrameSequence;
use crate::error::LibraryError;

/// One parsed descriptor: a sheet asset and its named clips.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationDef {
    /// Unique key; duplicates across the directory are a load-time error.
    pub key: String,
    /// Sheet image path, relative to the asset root.
    pub asset_file: String,
    pub sprite_count_x: u32,
    pub sprite_count_y: u32,
    /// Optional multiply-mask overlay image.
    #[serde(default)]
    pub asset_mask_file: Option<String>,
    /// Optional shadow overlay image.
    #[serde(default)]
    pub asset_shadow_file: Option<String>,
    /// Named clips within this sheet.
    pub frame_sequences: AHashMap<String, FrameSequence>,
}

/// All descriptors from one directory, keyed by their unique keys.
#[derive(Default)]
pub struct AnimationLibrary {
    defs: AHashMap<String, AnimationDef>,
}

impl AnimationLibrary {
    /// Parse every `*.json` in `directory`.
    ///
    /// Empty keys, duplicate keys, empty frame lists, and non-positive
    /// frame times are all fatal here: tolerating them would render wrong
    /// frames with no diagnostic.
    pub fn load_dir(directory: &Path) -> Result<Self, LibraryError> {
        if !directory.is_dir() {
            return Err(LibraryError::MissingDirectory(directory.to_path_buf()));
        }

        let mut defs: AHashMap<String, AnimationDef> = AHashMap::new();

        for entry in std::fs::read_dir(directory)? {
            let path = entry?.path();
            if !path.is_file() || path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let text = std::fs::read_to_string(&path)?;
            let def: AnimationDef =
                serde_json::from_str(&text).map_err(|source| LibraryError::Json {
                    path: path.clone(),
                    source,
                })?;

            if def.key.is_empty() {
                return Err(LibraryError::EmptyKey(path));
            }
            for (name, sequence) in &def.frame_sequences {
                if sequence.frames.is_empty() {
                    return Err(LibraryError::EmptySequence {
                        key: def.key.clone(),
                        sequence: name.clone(),
                    });
                }
                if sequence.seconds_per_frame <= 0.0 {
                    return Err(LibraryError::BadFrameTime {
                        key: def.key.clone(),
                        sequence: name.clone(),
                    });
                }
            }

            let key = def.key.clone();
            if defs.insert(key.clone(), def).is_some() {
                return Err(LibraryError::DuplicateKey { key, path });
            }
        }

        tracing::info!("Loaded {} animation descriptors from {:?}", defs.len(), directory);
        Ok(Self { defs })
    }

    pub fn get(&self, key: &str) -> Option<&AnimationDef> {
        self.defs.get(key)
    }

    /// Look up one clip by sheet key and sequence name.
    pub fn sequence(&self, key: &str, name: &str) -> Option<&FrameSequence> {
        self.defs.get(key)?.frame_sequences.get(name)
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnimationDef)> {
        self.defs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const BELT: &str = r#"{
        "key": "transport-belt",
        "assetFile": "entity/transport-belt.png",
        "spriteCountX": 16,
        "spriteCountY": 20,
        "assetShadowFile": "entity/transport-belt-shadow.png",
        "frameSequences": {
            "run": { "secondsPerFrame": 0.05, "frames": [0, 1, 2, 3] }
        }
    }"#;

    #[test]
    fn parses_descriptor_fields() {
        let def: AnimationDef = serde_json::from_str(BELT).unwrap();
        assert_eq!(def.key, "transport-belt");
        assert_eq!(def.sprite_count_x, 16);
        assert_eq!(def.asset_shadow_file.as_deref(), Some("entity/transport-belt-shadow.png"));
        assert!(def.asset_mask_file.is_none());

        let run = &def.frame_sequences["run"];
        assert_eq!(run.frames, vec![0, 1, 2, 3]);
        assert_eq!(run.seconds_per_frame, 0.05);
    }

    #[test]
    fn loads_directory_and_looks_up_sequences() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("belt.json"), BELT).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let lib = AnimationLibrary::load_dir(dir.path()).unwrap();
        assert_eq!(lib.len(), 1);
        let run = lib.sequence("transport-belt", "run").unwrap();
        assert_eq!(run.len(), 4);
        assert!(lib.sequence("transport-belt", "missing").is_none());
    }

    #[test]
    fn duplicate_key_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.json"), BELT).unwrap();
        fs::write(dir.path().join("b.json"), BELT).unwrap();

        assert!(matches!(
            AnimationLibrary::load_dir(dir.path()),
            Err(LibraryError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn empty_sequence_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bad = BELT.replace("[0, 1, 2, 3]", "[]");
        fs::write(dir.path().join("bad.json"), bad).unwrap();

        assert!(matches!(
            AnimationLibrary::load_dir(dir.path()),
            Err(LibraryError::EmptySequence { .. })
        ));
    }

    #[test]
    fn non_positive_frame_time_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let bad = BELT.replace("0.05", "0.0");
        fs::write(dir.path().join("bad.json"), bad).unwrap();

        assert!(matches!(
            AnimationLibrary::load_dir(dir.path()),
            Err(LibraryError::BadFrameTime { .. })
        ));
    }

    #[test]
    fn missing_directory_is_fatal() {
        assert!(matches!(
            AnimationLibrary::load_dir(Path::new("/nonexistent/animations")),
            Err(LibraryError::MissingDirectory(_))
        ));
    }
}
