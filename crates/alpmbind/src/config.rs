//! Handle configuration.

use std::path::PathBuf;

use crate::types::{LogLevel, SigLevel, Usage};

/// Configuration for [`Handle::with_config`](crate::Handle::with_config).
#[derive(Debug, Clone)]
pub struct HandleConfig {
    /// Install root.
    pub root: PathBuf,

    /// Database directory.
    pub dbpath: PathBuf,

    /// Packages never upgraded.
    pub ignore_pkgs: Vec<String>,

    /// Threshold of the default log sink.
    pub log_level: LogLevel,

    /// Sync databases, registered in order.
    pub sync_dbs: Vec<SyncDbConfig>,
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            dbpath: PathBuf::from("/var/lib/pacman"),
            ignore_pkgs: Vec::new(),
            log_level: LogLevel::Warning,
            sync_dbs: Vec::new(),
        }
    }
}

impl HandleConfig {
    /// Creates a configuration with the standard system paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the install root.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// Sets the database directory.
    #[must_use]
    pub fn dbpath(mut self, dbpath: impl Into<PathBuf>) -> Self {
        self.dbpath = dbpath.into();
        self
    }

    /// Adds a package to the ignore list.
    #[must_use]
    pub fn ignore_pkg(mut self, name: impl Into<String>) -> Self {
        self.ignore_pkgs.push(name.into());
        self
    }

    /// Sets the default log sink threshold.
    #[must_use]
    pub const fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Adds a sync database.
    #[must_use]
    pub fn sync_db(mut self, db: SyncDbConfig) -> Self {
        self.sync_dbs.push(db);
        self
    }
}

/// One sync database of a [`HandleConfig`].
#[derive(Debug, Clone)]
pub struct SyncDbConfig {
    /// Repository name, e.g. `core`.
    pub name: String,

    /// Signature checking policy.
    pub siglevel: SigLevel,

    /// Mirror URLs.
    pub servers: Vec<String>,

    /// Allowed usage; the library default when unset.
    pub usage: Option<Usage>,
}

impl SyncDbConfig {
    /// Creates a configuration for the repository `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            siglevel: SigLevel::USE_DEFAULT,
            servers: Vec::new(),
            usage: None,
        }
    }

    /// Sets the signature checking policy.
    #[must_use]
    pub const fn siglevel(mut self, siglevel: SigLevel) -> Self {
        self.siglevel = siglevel;
        self
    }

    /// Adds a mirror URL.
    #[must_use]
    pub fn server(mut self, url: impl Into<String>) -> Self {
        self.servers.push(url.into());
        self
    }

    /// Restricts what the database is used for.
    #[must_use]
    pub const fn usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = HandleConfig::default();
        assert_eq!(config.root, PathBuf::from("/"));
        assert_eq!(config.dbpath, PathBuf::from("/var/lib/pacman"));
        assert_eq!(config.log_level, LogLevel::Warning);
        assert!(config.sync_dbs.is_empty());
    }

    #[test]
    fn builder_pattern() {
        let config = HandleConfig::new()
            .root("/mnt")
            .dbpath("/mnt/var/lib/pacman")
            .ignore_pkg("linux")
            .log_level(LogLevel::Debug)
            .sync_db(
                SyncDbConfig::new("core")
                    .server("https://mirror.example/core/os/x86_64")
                    .usage(Usage::SEARCH | Usage::INSTALL),
            );

        assert_eq!(config.root, PathBuf::from("/mnt"));
        assert_eq!(config.ignore_pkgs, ["linux"]);
        assert_eq!(config.log_level, LogLevel::Debug);
        let core = &config.sync_dbs[0];
        assert_eq!(core.name, "core");
        assert_eq!(core.siglevel, SigLevel::USE_DEFAULT);
        assert_eq!(core.servers.len(), 1);
        assert_eq!(core.usage, Some(Usage::SEARCH | Usage::INSTALL));
    }
}
