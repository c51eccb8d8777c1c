use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use engine_logging::{engine_debug, engine_info, engine_warn};
use favicon_core::{find_existing_icon, IconMatch, ProcessedIcon};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::filename::icon_filename;

const MANIFEST_FILENAME: &str = ".favicon_store.ron";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("icon store path {0:?} is not a directory")]
    NotADirectory(PathBuf),
    #[error("icon store {path:?} is not writable: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt manifest {path:?}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("cannot serialize manifest: {0}")]
    Serialize(#[from] ron::Error),
}

/// How an icon ended up attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Byte-identical to an icon already in the store.
    Reused(String),
    Created(String),
}

impl Attachment {
    pub fn file_name(&self) -> &str {
        match self {
            Attachment::Reused(name) | Attachment::Created(name) => name,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Manifest {
    entries: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct StoredIcon {
    file_name: String,
    bytes: Vec<u8>,
}

/// Directory of PNG icons plus a manifest mapping entry keys to icon files.
#[derive(Debug)]
pub struct IconStore {
    dir: PathBuf,
    icons: Vec<StoredIcon>,
    manifest: Manifest,
    dirty: bool,
}

impl IconStore {
    /// Open `dir`, creating it when missing, and load what earlier runs left there.
    /// Fails if no file can be created in the directory.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        prepare_dir(dir)?;
        let icons = load_icons(dir)?;
        let manifest = load_manifest(dir)?;
        engine_info!(
            "Opened icon store {:?}: {} icons, {} entries",
            dir,
            icons.len(),
            manifest.entries.len()
        );
        Ok(Self {
            dir: dir.to_path_buf(),
            icons,
            manifest,
            dirty: false,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn icon_count(&self) -> usize {
        self.icons.len()
    }

    pub fn icon_for(&self, key: &str) -> Option<&str> {
        self.manifest.entries.get(key).map(String::as_str)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Attach `icon` to `key`, reusing a stored icon with identical bytes.
    pub fn attach(&mut self, key: &str, icon: &ProcessedIcon) -> Result<Attachment, StoreError> {
        let stored = self.icons.iter().map(|stored| stored.bytes.as_slice());
        let attachment = match find_existing_icon(&icon.bytes, stored) {
            IconMatch::Existing(index) => {
                let name = self.icons[index].file_name.clone();
                engine_debug!("{}: reusing stored icon {}", key, name);
                Attachment::Reused(name)
            }
            IconMatch::New => {
                let name = icon_filename(&icon.bytes);
                // Names are content hashes, so a file already on disk holds these bytes.
                if !self.dir.join(&name).is_file() {
                    self.replace_file(&name, &icon.bytes)?;
                }
                engine_debug!("{}: stored new icon {} from {}", key, name, icon.source_url);
                self.icons.push(StoredIcon {
                    file_name: name.clone(),
                    bytes: icon.bytes.clone(),
                });
                Attachment::Created(name)
            }
        };

        self.manifest
            .entries
            .insert(key.to_string(), attachment.file_name().to_string());
        self.dirty = true;
        Ok(attachment)
    }

    /// Write the manifest if anything changed. Returns whether a write happened.
    pub fn save(&mut self) -> Result<bool, StoreError> {
        if !self.dirty {
            return Ok(false);
        }
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(&self.manifest, pretty)?;
        self.replace_file(MANIFEST_FILENAME, content.as_bytes())?;
        self.dirty = false;
        engine_info!(
            "Saved icon manifest with {} entries to {:?}",
            self.manifest.entries.len(),
            self.dir
        );
        Ok(true)
    }

    /// Write through a temp file in the store directory, then rename over `name`.
    fn replace_file(&self, name: &str, content: &[u8]) -> Result<(), StoreError> {
        let unwritable = |source: io::Error| StoreError::Unwritable {
            path: self.dir.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(unwritable)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(self.dir.join(name))
            .map_err(|err| StoreError::Io(err.error))?;
        Ok(())
    }
}

fn prepare_dir(dir: &Path) -> Result<(), StoreError> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => return Err(StoreError::NotADirectory(dir.to_path_buf())),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            engine_info!("Creating icon store {:?}", dir);
            fs::create_dir_all(dir)?;
        }
        Err(err) => return Err(err.into()),
    }
    NamedTempFile::new_in(dir).map_err(|source| StoreError::Unwritable {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn load_icons(dir: &Path) -> Result<Vec<StoredIcon>, StoreError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_png = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    let mut icons = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
            engine_warn!("Skipping icon with non UTF-8 name {:?}", path);
            continue;
        };
        let file_name = file_name.to_string();
        let bytes = fs::read(&path)?;
        icons.push(StoredIcon { file_name, bytes });
    }
    Ok(icons)
}

fn load_manifest(dir: &Path) -> Result<Manifest, StoreError> {
    let path = dir.join(MANIFEST_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Manifest::default()),
        Err(err) => return Err(err.into()),
    };
    ron::from_str(&content).map_err(|source| StoreError::Manifest { path, source })
}
