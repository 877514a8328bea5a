//! File keyring
//!
//! Named tagged records kept in one JSON file. Records are decoded through a
//! `KeyCodec`, so a keyring only yields kinds its codec knows.

use crate::codec::{KeyCodec, KeyRecord, TaggedRecord};
use crate::error::{CodecError, KeyringError, SekeyResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

const KEYRING_VERSION: u32 = 1;

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyringFile {
    version: u32,
    keys: BTreeMap<String, TaggedRecord>,
}

#[derive(Debug)]
pub struct Keyring {
    path: PathBuf,
    codec: KeyCodec,
    file: KeyringFile,
}

impl Keyring {
    /// Open the keyring at `path` with every known key kind
    ///
    /// A missing file is an empty keyring; nothing is written until `save`.
    pub fn open(path: impl Into<PathBuf>) -> SekeyResult<Self> {
        Self::open_with_codec(path, KeyCodec::default())
    }

    pub fn open_with_codec(path: impl Into<PathBuf>, codec: KeyCodec) -> SekeyResult<Self> {
        let path = path.into();
        let file = match fs::read(&path) {
            Ok(bytes) => {
                let file: KeyringFile =
                    serde_json::from_slice(&bytes).map_err(|e| CodecError::InvalidEnvelope {
                        reason: format!("{}: {}", path.display(), e),
                    })?;
                if file.version != KEYRING_VERSION {
                    return Err(CodecError::InvalidEnvelope {
                        reason: format!(
                            "{}: unsupported keyring version {}",
                            path.display(),
                            file.version
                        ),
                    }
                    .into());
                }
                debug!("Loaded {} keys from {}", file.keys.len(), path.display());
                file
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No keyring at {}, starting empty", path.display());
                KeyringFile {
                    version: KEYRING_VERSION,
                    keys: BTreeMap::new(),
                }
            }
            Err(e) => return Err(io_error(&path, e).into()),
        };

        Ok(Self { path, codec, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> &KeyCodec {
        &self.codec
    }

    /// Store a record under a new name
    ///
    /// # Errors
    ///
    /// Returns `KeyringError::NameTaken` if the name is in use,
    /// `KeyringError::NameMismatch` if the record carries another name, or a
    /// codec error if the record's kind is not registered.
    pub fn add(&mut self, name: &str, record: &KeyRecord) -> SekeyResult<()> {
        if let Some(record_name) = record.name() {
            if record_name != name {
                return Err(KeyringError::NameMismatch {
                    name: name.to_string(),
                    record_name: record_name.to_string(),
                }
                .into());
            }
        }
        if self.file.keys.contains_key(name) {
            return Err(KeyringError::NameTaken {
                name: name.to_string(),
            }
            .into());
        }

        let tagged = self.codec.encode(record)?;
        self.file.keys.insert(name.to_string(), tagged);
        info!("Added {} key {}", record.tag(), name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> SekeyResult<KeyRecord> {
        let tagged = self.file.keys.get(name).ok_or_else(|| KeyringError::NotFound {
            name: name.to_string(),
        })?;
        self.codec.decode(tagged)
    }

    /// Raw envelope of an entry, without decoding
    pub fn get_tagged(&self, name: &str) -> SekeyResult<&TaggedRecord> {
        Ok(self.file.keys.get(name).ok_or_else(|| KeyringError::NotFound {
            name: name.to_string(),
        })?)
    }

    /// Drop an entry and return its envelope
    ///
    /// The record is not decoded, so entries of unknown kinds or with broken
    /// payloads can still be removed.
    pub fn remove(&mut self, name: &str) -> SekeyResult<TaggedRecord> {
        let tagged = self
            .file
            .keys
            .remove(name)
            .ok_or_else(|| KeyringError::NotFound {
                name: name.to_string(),
            })?;
        info!("Removed {} key {}", tagged.type_tag, name);
        Ok(tagged)
    }

    pub fn names(&self) -> Vec<&str> {
        self.file.keys.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.file.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.file.keys.is_empty()
    }

    /// Write the keyring back to disk
    ///
    /// The file is replaced atomically: a reader sees either the old or the
    /// new keyring, never a partial one.
    pub fn save(&self) -> SekeyResult<()> {
        let json = serde_json::to_vec_pretty(&self.file).map_err(|e| CodecError::Encoding {
            tag: "keyring".to_string(),
            reason: e.to_string(),
        })?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
        tmp.write_all(&json).map_err(|e| io_error(tmp.path(), e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| io_error(&self.path, e.error))?;

        debug!("Saved {} keys to {}", self.len(), self.path.display());
        Ok(())
    }
}

fn io_error(path: &Path, source: io::Error) -> KeyringError {
    KeyringError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SekeyError;
    use crate::keys::{LocalInfo, LocalKey, OfflineInfo, SecureElementInfo};
    use crate::model::{fixtures::random_signing_key, PublicKey, Secp256r1PublicKey};
    use tempfile::TempDir;

    fn element_info(name: &str) -> KeyRecord {
        SecureElementInfo {
            name: name.to_string(),
            public_key: Secp256r1PublicKey::from(random_signing_key().verifying_key()),
        }
        .into()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let keyring = Keyring::open(dir.path().join("keyring.json")).unwrap();

        assert!(keyring.is_empty());
        assert!(!dir.path().join("keyring.json").exists());
    }

    #[test]
    fn test_add_save_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring.json");
        let record = element_info("alice");

        let mut keyring = Keyring::open(&path).unwrap();
        keyring.add("alice", &record).unwrap();
        keyring.save().unwrap();

        let reopened = Keyring::open(&path).unwrap();
        assert_eq!(reopened.names(), vec!["alice"]);
        assert_eq!(reopened.get("alice").unwrap(), record);
    }

    #[test]
    fn test_file_holds_tagged_records() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring.json");
        let mut keyring = Keyring::open(&path).unwrap();
        keyring.add("alice", &element_info("alice")).unwrap();
        keyring.save().unwrap();

        let json: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["version"], 1);
        assert_eq!(json["keys"]["alice"]["type"], "keys/secureElementInfo");
        assert!(json["keys"]["alice"]["payload"].is_string());
    }

    #[test]
    fn test_add_duplicate_name() {
        let dir = TempDir::new().unwrap();
        let mut keyring = Keyring::open(dir.path().join("keyring.json")).unwrap();
        keyring.add("alice", &element_info("alice")).unwrap();

        assert!(matches!(
            keyring.add("alice", &element_info("alice")).unwrap_err(),
            SekeyError::Keyring(KeyringError::NameTaken { .. })
        ));
        assert_eq!(keyring.len(), 1);
    }

    #[test]
    fn test_get_missing() {
        let dir = TempDir::new().unwrap();
        let keyring = Keyring::open(dir.path().join("keyring.json")).unwrap();

        assert!(matches!(
            keyring.get("nobody").unwrap_err(),
            SekeyError::Keyring(KeyringError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove() {
        let dir = TempDir::new().unwrap();
        let mut keyring = Keyring::open(dir.path().join("keyring.json")).unwrap();
        let record = element_info("alice");
        keyring.add("alice", &record).unwrap();

        let removed = keyring.remove("alice").unwrap();
        assert_eq!(keyring.codec().decode(&removed).unwrap(), record);
        assert!(keyring.is_empty());
        assert!(matches!(
            keyring.remove("alice").unwrap_err(),
            SekeyError::Keyring(KeyringError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_undecodable_entries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring.json");
        let json = serde_json::json!({
            "version": 1,
            "keys": {
                "stale": { "type": "keys/multiInfo", "payload": hex::encode(b"{}") },
                "bad": { "type": "keys/offlineInfo", "payload": "00" },
            },
        });
        fs::write(&path, serde_json::to_vec(&json).unwrap()).unwrap();

        let mut keyring = Keyring::open(&path).unwrap();
        assert!(keyring.get("stale").is_err());
        assert!(keyring.get("bad").is_err());

        assert_eq!(keyring.remove("stale").unwrap().type_tag, "keys/multiInfo");
        assert_eq!(keyring.remove("bad").unwrap().type_tag, "keys/offlineInfo");
        keyring.save().unwrap();

        assert!(Keyring::open(&path).unwrap().is_empty());
    }

    #[test]
    fn test_add_rejects_other_record_name() {
        let dir = TempDir::new().unwrap();
        let mut keyring = Keyring::open(dir.path().join("keyring.json")).unwrap();

        match keyring.add("alice", &element_info("bob")).unwrap_err() {
            SekeyError::Keyring(KeyringError::NameMismatch { name, record_name }) => {
                assert_eq!(name, "alice");
                assert_eq!(record_name, "bob");
            }
            other => panic!("expected error: {other:?}"),
        }
        assert!(keyring.is_empty());
    }

    #[test]
    fn test_add_bare_record_under_any_name() {
        let dir = TempDir::new().unwrap();
        let mut keyring = Keyring::open(dir.path().join("keyring.json")).unwrap();
        let record: KeyRecord = LocalKey::generate().to_record().into();

        keyring.add("soft-secret", &record).unwrap();
        assert_eq!(keyring.get("soft-secret").unwrap(), record);
    }

    #[test]
    fn test_open_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring.json");
        fs::write(&path, br#"{"version":99,"keys":{}}"#).unwrap();

        match Keyring::open(&path).unwrap_err() {
            SekeyError::Codec(CodecError::InvalidEnvelope { reason }) => {
                assert!(reason.contains("version 99"))
            }
            other => panic!("expected error: {other:?}"),
        }
    }

    #[test]
    fn test_names_sorted() {
        let dir = TempDir::new().unwrap();
        let mut keyring = Keyring::open(dir.path().join("keyring.json")).unwrap();
        for name in ["carol", "alice", "bob"] {
            keyring.add(name, &element_info(name)).unwrap();
        }

        assert_eq!(keyring.names(), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_mixed_kinds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring.json");
        let local = LocalKey::generate();
        let mut keyring = Keyring::open(&path).unwrap();
        let local_info: KeyRecord = LocalInfo {
            name: "local".to_string(),
            public_key: local.public_key(),
            private_key: keyring.codec().encode(&local.to_record().into()).unwrap(),
        }
        .into();
        let offline: KeyRecord = OfflineInfo {
            name: "offline".to_string(),
            public_key: PublicKey::Secp256r1(local.public_key()),
        }
        .into();
        keyring.add("local", &local_info).unwrap();
        keyring.add("offline", &offline).unwrap();
        keyring.save().unwrap();

        let reopened = Keyring::open(&path).unwrap();
        assert_eq!(reopened.get("local").unwrap(), local_info);
        assert_eq!(reopened.get("offline").unwrap(), offline);
    }

    #[test]
    fn test_narrow_codec_cannot_read_other_kinds() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring.json");
        let mut keyring = Keyring::open(&path).unwrap();
        keyring.add("alice", &element_info("alice")).unwrap();
        keyring.save().unwrap();

        let mut codec = KeyCodec::new();
        codec.register::<OfflineInfo>().unwrap();
        let narrow = Keyring::open_with_codec(&path, codec).unwrap();

        assert!(matches!(
            narrow.get("alice").unwrap_err(),
            SekeyError::Codec(CodecError::UnknownTypeTag { .. })
        ));
    }

    #[test]
    fn test_open_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keyring.json");
        fs::write(&path, b"{ not json").unwrap();

        assert!(matches!(
            Keyring::open(&path).unwrap_err(),
            SekeyError::Codec(CodecError::InvalidEnvelope { .. })
        ));
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("keyring.json");
        let mut keyring = Keyring::open(&path).unwrap();
        keyring.add("alice", &element_info("alice")).unwrap();
        keyring.save().unwrap();

        assert!(path.exists());
    }
}
