//! Fingerprinted on-disk caches.
//!
//! Expensive derived tables (nearest-road snaps, road → feature lists) are
//! persisted between runs.  Each file records a [`Fingerprint`] of the input
//! files it was derived from (path + modification time) and a format
//! version.  A file is only used when both match exactly; otherwise it is
//! discarded and rebuilt, never partially reused.
//!
//! File layout (JSON):
//!
//! ```text
//! { "version": 1, "fingerprint": { "sources": [...] }, "payload": ... }
//! ```

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::SpatialResult;

/// Bump whenever a persisted payload type changes shape.
pub const CACHE_FORMAT_VERSION: u32 = 1;

// ── Fingerprint ───────────────────────────────────────────────────────────────

/// One input file's identity at the time a cache was built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceStamp {
    pub path:           String,
    pub modified_secs:  u64,
    pub modified_nanos: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub sources: Vec<SourceStamp>,
}

impl Fingerprint {
    /// Stamp each path with its current modification time.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> SpatialResult<Self> {
        let mut sources = Vec::with_capacity(paths.len());
        for p in paths {
            let p = p.as_ref();
            let modified = fs::metadata(p)?.modified()?;
            let since = modified.duration_since(UNIX_EPOCH).unwrap_or_default();
            sources.push(SourceStamp {
                path:           p.display().to_string(),
                modified_secs:  since.as_secs(),
                modified_nanos: since.subsec_nanos(),
            });
        }
        Ok(Self { sources })
    }

    pub fn from_stamps(sources: Vec<SourceStamp>) -> Self {
        Self { sources }
    }
}

// ── CacheStore ────────────────────────────────────────────────────────────────

/// Persistence backend for one cached value of type `T`.
pub trait CacheStore<T> {
    /// The stored value, if one exists for exactly this fingerprint and the
    /// current format version.  Stale or unreadable entries yield `None`.
    fn load(&self, fingerprint: &Fingerprint) -> SpatialResult<Option<T>>;

    fn save(&self, value: &T, fingerprint: &Fingerprint) -> SpatialResult<()>;
}

/// A store that never has anything.  Used when persistence is disabled.
pub struct NoStore;

impl<T> CacheStore<T> for NoStore {
    fn load(&self, _fingerprint: &Fingerprint) -> SpatialResult<Option<T>> {
        Ok(None)
    }

    fn save(&self, _value: &T, _fingerprint: &Fingerprint) -> SpatialResult<()> {
        Ok(())
    }
}

/// A single JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path:    PathBuf,
    version: u32,
}

#[derive(Deserialize)]
struct Header {
    version:     u32,
    fingerprint: Fingerprint,
}

#[derive(Deserialize)]
struct Body<T> {
    payload: T,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    version:     u32,
    fingerprint: &'a Fingerprint,
    payload:     &'a T,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), version: CACHE_FORMAT_VERSION }
    }

    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn discard(&self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(path = %self.path.display(), error = %e, "could not remove stale cache");
        }
    }
}

impl<T: Serialize + DeserializeOwned> CacheStore<T> for JsonFileStore {
    fn load(&self, fingerprint: &Fingerprint) -> SpatialResult<Option<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let header: Header = match serde_json::from_slice(&bytes) {
            Ok(h) => h,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "unreadable cache file, rebuilding");
                self.discard();
                return Ok(None);
            }
        };
        if header.version != self.version || header.fingerprint != *fingerprint {
            info!(
                path = %self.path.display(),
                found_version = header.version,
                "stale cache, rebuilding"
            );
            self.discard();
            return Ok(None);
        }

        match serde_json::from_slice::<Body<T>>(&bytes) {
            Ok(body) => Ok(Some(body.payload)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "corrupt cache payload, rebuilding");
                self.discard();
                Ok(None)
            }
        }
    }

    fn save(&self, value: &T, fingerprint: &Fingerprint) -> SpatialResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        // Write beside the target and rename so readers never see half a file.
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(
                &mut w,
                &Envelope { version: self.version, fingerprint, payload: value },
            )?;
            w.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl JsonFileStore {
    /// Read a payload without any fingerprint check.  Debugging aid.
    pub fn peek<T: DeserializeOwned>(&self) -> SpatialResult<T> {
        let reader = BufReader::new(File::open(&self.path)?);
        let body: Body<T> = serde_json::from_reader(reader)?;
        Ok(body.payload)
    }
}

// ── load_or_build ─────────────────────────────────────────────────────────────

/// How a cached value was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    /// Read from the store; fingerprint matched.
    Loaded,
    /// Built from scratch (missing, stale or unreadable file).
    Rebuilt,
}

/// Return the stored value for `fingerprint`, or build, save and return a
/// fresh one.  A failed save is logged and otherwise ignored: the value is
/// still correct, it just won't be reused next run.
pub fn load_or_build<T, S, F>(
    store: &S,
    fingerprint: &Fingerprint,
    build: F,
) -> SpatialResult<(T, CacheStatus)>
where
    S: CacheStore<T> + ?Sized,
    F: FnOnce() -> SpatialResult<T>,
{
    if let Some(value) = store.load(fingerprint)? {
        return Ok((value, CacheStatus::Loaded));
    }
    let value = build()?;
    if let Err(e) = store.save(&value, fingerprint) {
        warn!(error = %e, "failed to persist cache");
    }
    Ok((value, CacheStatus::Rebuilt))
}
