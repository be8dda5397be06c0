//! Host-side value types.
//!
//! Enumerations and bit sets mirror the native constants one to one.
//! Value records ([`Dependency`], [`File`], [`BackupFile`]) are fully owned
//! copies and stay valid after the native memory they came from is gone.

use std::ffi::c_int;
use std::fmt;

use alpmbind_sys as sys;
use bitflags::bitflags;

use crate::error::{Error, Result};

/// Severity of a native log line.
///
/// Ordered from most to least severe, so `level <= threshold` selects
/// everything at least as severe as `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum LogLevel {
    /// Errors.
    Error = sys::ALPM_LOG_ERROR,
    /// Warnings.
    Warning = sys::ALPM_LOG_WARNING,
    /// Debug output.
    Debug = sys::ALPM_LOG_DEBUG,
    /// Function tracing.
    Function = sys::ALPM_LOG_FUNCTION,
}

impl LogLevel {
    /// Returns the native value.
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }
}

impl TryFrom<c_int> for LogLevel {
    type Error = Error;

    fn try_from(value: c_int) -> Result<Self> {
        match value {
            sys::ALPM_LOG_ERROR => Ok(Self::Error),
            sys::ALPM_LOG_WARNING => Ok(Self::Warning),
            sys::ALPM_LOG_DEBUG => Ok(Self::Debug),
            sys::ALPM_LOG_FUNCTION => Ok(Self::Function),
            other => Err(Error::unknown_value("log level", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Debug => "debug",
            Self::Function => "function",
        })
    }
}

/// Discriminant of a question record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum QuestionType {
    /// Install a package that is on the ignore list?
    InstallIgnorePkg = sys::ALPM_QUESTION_INSTALL_IGNOREPKG,
    /// Replace one package with another?
    ReplacePkg = sys::ALPM_QUESTION_REPLACE_PKG,
    /// Remove a conflicting package?
    ConflictPkg = sys::ALPM_QUESTION_CONFLICT_PKG,
    /// Delete a corrupted package file?
    CorruptedPkg = sys::ALPM_QUESTION_CORRUPTED_PKG,
    /// Skip packages that cannot be upgraded?
    RemovePkgs = sys::ALPM_QUESTION_REMOVE_PKGS,
    /// Which provider satisfies a dependency?
    SelectProvider = sys::ALPM_QUESTION_SELECT_PROVIDER,
    /// Import a missing PGP key?
    ImportKey = sys::ALPM_QUESTION_IMPORT_KEY,
}

impl QuestionType {
    /// Returns the native value.
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }
}

impl TryFrom<c_int> for QuestionType {
    type Error = Error;

    fn try_from(value: c_int) -> Result<Self> {
        match value {
            sys::ALPM_QUESTION_INSTALL_IGNOREPKG => Ok(Self::InstallIgnorePkg),
            sys::ALPM_QUESTION_REPLACE_PKG => Ok(Self::ReplacePkg),
            sys::ALPM_QUESTION_CONFLICT_PKG => Ok(Self::ConflictPkg),
            sys::ALPM_QUESTION_CORRUPTED_PKG => Ok(Self::CorruptedPkg),
            sys::ALPM_QUESTION_REMOVE_PKGS => Ok(Self::RemovePkgs),
            sys::ALPM_QUESTION_SELECT_PROVIDER => Ok(Self::SelectProvider),
            sys::ALPM_QUESTION_IMPORT_KEY => Ok(Self::ImportKey),
            other => Err(Error::unknown_value("question type", other)),
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::InstallIgnorePkg => "install ignored package",
            Self::ReplacePkg => "replace package",
            Self::ConflictPkg => "conflicting package",
            Self::CorruptedPkg => "corrupted package",
            Self::RemovePkgs => "remove packages",
            Self::SelectProvider => "select provider",
            Self::ImportKey => "import key",
        })
    }
}

/// Why a package is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum PkgReason {
    /// Installed on request.
    #[default]
    Explicit = sys::ALPM_PKG_REASON_EXPLICIT,
    /// Pulled in as a dependency.
    Depend = sys::ALPM_PKG_REASON_DEPEND,
}

impl TryFrom<c_int> for PkgReason {
    type Error = Error;

    fn try_from(value: c_int) -> Result<Self> {
        match value {
            sys::ALPM_PKG_REASON_EXPLICIT => Ok(Self::Explicit),
            sys::ALPM_PKG_REASON_DEPEND => Ok(Self::Depend),
            other => Err(Error::unknown_value("package reason", other)),
        }
    }
}

impl fmt::Display for PkgReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Explicit => "Explicitly installed",
            Self::Depend => "Installed as a dependency for another package",
        })
    }
}

/// Where a package record was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum PkgFrom {
    /// A package file.
    File = sys::ALPM_PKG_FROM_FILE,
    /// The local database.
    LocalDb = sys::ALPM_PKG_FROM_LOCALDB,
    /// A sync database.
    SyncDb = sys::ALPM_PKG_FROM_SYNCDB,
}

impl TryFrom<c_int> for PkgFrom {
    type Error = Error;

    fn try_from(value: c_int) -> Result<Self> {
        match value {
            sys::ALPM_PKG_FROM_FILE => Ok(Self::File),
            sys::ALPM_PKG_FROM_LOCALDB => Ok(Self::LocalDb),
            sys::ALPM_PKG_FROM_SYNCDB => Ok(Self::SyncDb),
            other => Err(Error::unknown_value("package origin", other)),
        }
    }
}

/// Version comparison of a dependency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(i32)]
pub enum DepMod {
    /// Any version.
    #[default]
    Any = sys::ALPM_DEP_MOD_ANY,
    /// `=`
    Eq = sys::ALPM_DEP_MOD_EQ,
    /// `>=`
    Ge = sys::ALPM_DEP_MOD_GE,
    /// `<=`
    Le = sys::ALPM_DEP_MOD_LE,
    /// `>`
    Gt = sys::ALPM_DEP_MOD_GT,
    /// `<`
    Lt = sys::ALPM_DEP_MOD_LT,
}

impl DepMod {
    /// Returns the native value.
    pub const fn as_raw(self) -> c_int {
        self as c_int
    }

    /// Returns the operator as written in a dependency string.
    pub const fn operator(self) -> &'static str {
        match self {
            Self::Any => "",
            Self::Eq => "=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

impl TryFrom<c_int> for DepMod {
    type Error = Error;

    fn try_from(value: c_int) -> Result<Self> {
        match value {
            sys::ALPM_DEP_MOD_ANY => Ok(Self::Any),
            sys::ALPM_DEP_MOD_EQ => Ok(Self::Eq),
            sys::ALPM_DEP_MOD_GE => Ok(Self::Ge),
            sys::ALPM_DEP_MOD_LE => Ok(Self::Le),
            sys::ALPM_DEP_MOD_GT => Ok(Self::Gt),
            sys::ALPM_DEP_MOD_LT => Ok(Self::Lt),
            other => Err(Error::unknown_value("dependency modifier", other)),
        }
    }
}

bitflags! {
    /// Signature checking policy.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SigLevel: c_int {
        /// Packages must be signed.
        const PACKAGE = sys::ALPM_SIG_PACKAGE;
        /// Package signatures are optional.
        const PACKAGE_OPTIONAL = sys::ALPM_SIG_PACKAGE_OPTIONAL;
        /// Marginal trust is enough for packages.
        const PACKAGE_MARGINAL_OK = sys::ALPM_SIG_PACKAGE_MARGINAL_OK;
        /// Unknown trust is enough for packages.
        const PACKAGE_UNKNOWN_OK = sys::ALPM_SIG_PACKAGE_UNKNOWN_OK;
        /// Databases must be signed.
        const DATABASE = sys::ALPM_SIG_DATABASE;
        /// Database signatures are optional.
        const DATABASE_OPTIONAL = sys::ALPM_SIG_DATABASE_OPTIONAL;
        /// Marginal trust is enough for databases.
        const DATABASE_MARGINAL_OK = sys::ALPM_SIG_DATABASE_MARGINAL_OK;
        /// Unknown trust is enough for databases.
        const DATABASE_UNKNOWN_OK = sys::ALPM_SIG_DATABASE_UNKNOWN_OK;
        /// Use the handle's default level.
        const USE_DEFAULT = sys::ALPM_SIG_USE_DEFAULT;
    }
}

bitflags! {
    /// What a sync database may be used for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Usage: c_int {
        /// Refresh.
        const SYNC = sys::ALPM_DB_USAGE_SYNC;
        /// Search.
        const SEARCH = sys::ALPM_DB_USAGE_SEARCH;
        /// Install from.
        const INSTALL = sys::ALPM_DB_USAGE_INSTALL;
        /// Upgrade from.
        const UPGRADE = sys::ALPM_DB_USAGE_UPGRADE;
        /// Everything.
        const ALL = sys::ALPM_DB_USAGE_ALL;
    }
}

bitflags! {
    /// How a package was validated. Empty means unknown.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Validation: c_int {
        /// No validation.
        const NONE = sys::ALPM_PKG_VALIDATION_NONE;
        /// MD5 checksum.
        const MD5SUM = sys::ALPM_PKG_VALIDATION_MD5SUM;
        /// SHA-256 checksum.
        const SHA256SUM = sys::ALPM_PKG_VALIDATION_SHA256SUM;
        /// PGP signature.
        const SIGNATURE = sys::ALPM_PKG_VALIDATION_SIGNATURE;
    }
}

/// A dependency, conflict, provision or replacement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dependency {
    /// Package name.
    pub name: String,
    /// Version constraint; empty when unset.
    pub version: String,
    /// Description (optional dependencies); empty when unset.
    pub description: String,
    /// Native hash of `name`.
    pub name_hash: u64,
    /// Comparison against `version`.
    pub modifier: DepMod,
}

impl Dependency {
    /// Parses a dependency string such as `glibc>=2.38` through the native
    /// parser.
    pub fn parse(depstring: &str) -> Result<Self> {
        let text = crate::marshal::to_cstring(depstring)?;
        // Safety: the native record is copied out and freed before returning.
        unsafe {
            let raw = sys::alpm_dep_from_string(text.as_ptr());
            if raw.is_null() {
                return Err(Error::from_code(crate::ErrorCode::WRONG_ARGS));
            }
            let dep = crate::marshal::depend_from_raw(raw);
            sys::alpm_dep_free(raw);
            Ok(dep)
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if self.modifier != DepMod::Any {
            write!(f, "{}{}", self.modifier.operator(), self.version)?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

/// One entry of a package's file list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct File {
    /// Path relative to the install root.
    pub name: String,
    /// Size in bytes.
    pub size: i64,
    /// Permission bits.
    pub mode: u32,
}

/// A configuration file that is preserved on upgrade.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BackupFile {
    /// Path relative to the install root.
    pub name: String,
    /// MD5 of the file as installed.
    pub hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_levels_order_by_severity() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Function);
        assert_eq!(LogLevel::try_from(sys::ALPM_LOG_DEBUG).unwrap(), LogLevel::Debug);
        assert!(LogLevel::try_from(3).is_err());
    }

    #[test]
    fn question_type_discriminants() {
        for kind in [
            QuestionType::InstallIgnorePkg,
            QuestionType::ReplacePkg,
            QuestionType::ConflictPkg,
            QuestionType::CorruptedPkg,
            QuestionType::RemovePkgs,
            QuestionType::SelectProvider,
            QuestionType::ImportKey,
        ] {
            assert_eq!(QuestionType::try_from(kind.as_raw()).unwrap(), kind);
        }
        let err = QuestionType::try_from(0).unwrap_err();
        assert!(matches!(err, Error::UnknownValue { value: 0, .. }));
    }

    #[test]
    fn dependency_display() {
        let dep = Dependency {
            name: "glibc".into(),
            version: "2.38".into(),
            modifier: DepMod::Ge,
            ..Dependency::default()
        };
        assert_eq!(dep.to_string(), "glibc>=2.38");

        let opt = Dependency {
            name: "python".into(),
            description: "for scripts".into(),
            ..Dependency::default()
        };
        assert_eq!(opt.to_string(), "python: for scripts");
    }

    #[test]
    fn dependency_parse() {
        let dep = Dependency::parse("linux-api-headers<6.0").unwrap();
        assert_eq!(dep.name, "linux-api-headers");
        assert_eq!(dep.version, "6.0");
        assert_eq!(dep.modifier, DepMod::Lt);
        assert_ne!(dep.name_hash, 0);
        assert_eq!(dep.to_string(), "linux-api-headers<6.0");
    }

    #[test]
    fn dependency_parse_rejects_nul() {
        assert!(matches!(Dependency::parse("a\0b"), Err(Error::InteriorNul(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn dependency_serializes() {
        let dep = Dependency::parse("sh").unwrap();
        let json = serde_json::to_value(&dep).unwrap();
        assert_eq!(json["name"], "sh");
        assert_eq!(json["modifier"], "Any");
        let back: Dependency = serde_json::from_value(json).unwrap();
        assert_eq!(back, dep);
    }

    #[test]
    fn usage_all_covers_every_flag() {
        assert!(Usage::ALL.contains(Usage::SYNC | Usage::SEARCH | Usage::INSTALL | Usage::UPGRADE));
        assert_eq!(Usage::ALL.bits(), sys::ALPM_DB_USAGE_ALL);
    }
}
