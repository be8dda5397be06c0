//! Database contents for the emulated library.
//!
//! The system library reads repositories from `dbpath`. The emulation
//! reads them from a process-wide registry keyed by `(dbpath, name)`,
//! filled by tests before a handle registers the database.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Name under which the local (installed) database is seeded.
pub const LOCAL_DB_NAME: &str = "local";

/// One dependency entry of a seeded package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependSeed {
    /// Dependency string in `name[op version][: description]` form.
    pub depstring: String,
}

impl DependSeed {
    /// Creates a dependency from its string form.
    pub fn new(depstring: impl Into<String>) -> Self {
        Self { depstring: depstring.into() }
    }
}

/// A file list entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSeed {
    /// Path relative to root.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Permission bits.
    pub mode: u32,
}

/// Contents of one package record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSeed {
    /// Package name.
    pub name: String,
    /// Full version (`epoch:pkgver-pkgrel`).
    pub version: String,
    /// pkgbase, if different from the name.
    pub base: Option<String>,
    /// Package file name.
    pub filename: Option<String>,
    /// Description.
    pub desc: Option<String>,
    /// Upstream URL.
    pub url: Option<String>,
    /// Target architecture.
    pub arch: Option<String>,
    /// Packager identity.
    pub packager: Option<String>,
    /// MD5 of the package file.
    pub md5sum: Option<String>,
    /// SHA256 of the package file.
    pub sha256sum: Option<String>,
    /// Detached signature, base64.
    pub base64_sig: Option<String>,
    /// Build date, seconds since the epoch.
    pub builddate: i64,
    /// Install date, seconds since the epoch.
    pub installdate: i64,
    /// Packed size.
    pub size: i64,
    /// Installed size.
    pub isize: i64,
    /// Install reason value.
    pub reason: i32,
    /// Validation bits.
    pub validation: i32,
    /// Licenses.
    pub licenses: Vec<String>,
    /// Groups.
    pub groups: Vec<String>,
    /// Runtime dependencies.
    pub depends: Vec<DependSeed>,
    /// Optional dependencies.
    pub optdepends: Vec<DependSeed>,
    /// Check dependencies.
    pub checkdepends: Vec<DependSeed>,
    /// Make dependencies.
    pub makedepends: Vec<DependSeed>,
    /// Conflicts.
    pub conflicts: Vec<DependSeed>,
    /// Provisions.
    pub provides: Vec<DependSeed>,
    /// Replaced packages.
    pub replaces: Vec<DependSeed>,
    /// File list.
    pub files: Vec<FileSeed>,
    /// Backup entries as `(path, md5)`.
    pub backup: Vec<(String, String)>,
}

impl PackageSeed {
    /// Creates a seed with a name and version; everything else empty.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

static REGISTRY: Mutex<Option<HashMap<(PathBuf, String), Vec<PackageSeed>>>> =
    parking_lot::const_mutex(None);

/// Stores the contents of database `name` under `dbpath`.
///
/// Replaces any previous contents. Handles read the registry when the
/// database is registered (or, for `local`, when the handle is created).
pub fn seed_database(dbpath: impl AsRef<Path>, name: &str, packages: Vec<PackageSeed>) {
    let key = (dbpath.as_ref().to_path_buf(), name.to_string());
    REGISTRY.lock().get_or_insert_with(HashMap::new).insert(key, packages);
}

/// Removes every database seeded under `dbpath`.
pub fn clear_seeds(dbpath: impl AsRef<Path>) {
    let dbpath = dbpath.as_ref();
    if let Some(map) = REGISTRY.lock().as_mut() {
        map.retain(|(path, _), _| path != dbpath);
    }
}

pub(crate) fn seeded(dbpath: &Path, name: &str) -> Option<Vec<PackageSeed>> {
    REGISTRY
        .lock()
        .as_ref()
        .and_then(|map| map.get(&(dbpath.to_path_buf(), name.to_string())).cloned())
}
