//! JSON / YAML codec for config, tilemap, animation and save documents.

pub mod save;

pub use save::{EntityState, SaveState};

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

impl Format {
    /// Pick a format from the file extension (`json`, `yaml`, `yml`).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }
}

pub fn to_string<T: Serialize>(value: &T, format: Format) -> Result<String> {
    Ok(match format {
        Format::Json => serde_json::to_string_pretty(value)?,
        Format::Yaml => serde_yaml::to_string(value)?,
    })
}

pub fn from_str<T: DeserializeOwned>(text: &str, format: Format) -> Result<T> {
    Ok(match format {
        Format::Json => serde_json::from_str(text)?,
        Format::Yaml => serde_yaml::from_str(text)?,
    })
}

/// Serialize `value` to `path`, picking the format from the extension.
///
/// Writes to a sibling `.tmp` file first and renames it over the target,
/// so readers never observe a half-written document.
pub fn save<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let text = to_string(value, Format::from_path(path)?)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    fs::write(tmp, text).map_err(|e| Error::io(tmp, e))?;
    if let Err(e) = fs::rename(tmp, path) {
        if let Err(cleanup) = fs::remove_file(tmp) {
            log::warn!("serialization: could not remove {}: {cleanup}", tmp.display());
        }
        return Err(Error::io(path, e));
    }
    log::debug!("serialization: wrote {}", path.display());
    Ok(())
}

pub fn load<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<T> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    from_str(&text, format)
}

// ── Versioned documents ─────────────────────────────────────────────────────

/// Envelope stamping a document with its schema version.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub version: u32,
    pub data: T,
}

impl<T> Versioned<T> {
    pub fn new(version: u32, data: T) -> Self {
        Self { version, data }
    }
}

/// Load a [`Versioned`] document, rejecting versions newer than `expected`.
///
/// Older versions load as-is; the caller decides how to migrate them.
pub fn load_versioned<P: AsRef<Path>, T: DeserializeOwned>(path: P, expected: u32) -> Result<Versioned<T>> {
    let doc: Versioned<T> = load(path.as_ref())?;
    check_version(path.as_ref(), doc.version, expected)?;
    Ok(doc)
}

/// `VersionMismatch` when `found` is newer than `expected`. Older versions
/// pass with an info log so the caller can migrate.
pub fn check_version(source: &Path, found: u32, expected: u32) -> Result<()> {
    if found > expected {
        return Err(Error::VersionMismatch { found, expected });
    }
    if found < expected {
        log::info!("serialization: {} is version {found}, current is {expected}", source.display());
    }
    Ok(())
}

pub fn save_versioned<P: AsRef<Path>, T: Serialize>(path: P, version: u32, data: &T) -> Result<()> {
    #[derive(Serialize)]
    struct Borrowed<'a, T> {
        version: u32,
        data: &'a T,
    }
    save(path, &Borrowed { version, data })
}
