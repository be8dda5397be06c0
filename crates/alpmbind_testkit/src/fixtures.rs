//! Test fixtures and handle helpers.
//!
//! A [`TestHandle`] owns a temporary directory that serves as both root
//! and dbpath, seeds repositories into the emulated library before the
//! handle is created, and exposes the emulated library's log and question
//! hooks so tests can play the part of libalpm.

#![allow(unsafe_code)]

use std::io::{self, Write};
use std::ops::Deref;
use std::path::Path;
use std::ptr;
use std::sync::Arc;

use alpmbind::{Db, Handle, LogLevel, Package, QuestionType, SigLevel};
use alpmbind_sys::emulated;
use tempfile::TempDir;

pub use alpmbind_sys::emulated::{DependSeed, FileSeed, PackageSeed, LOCAL_DB_NAME};

/// A named repository to seed.
#[derive(Debug, Clone, Default)]
pub struct Repo {
    /// Repository name, e.g. `core`.
    pub name: String,
    /// Package records in cache order.
    pub packages: Vec<PackageSeed>,
}

impl Repo {
    /// Creates an empty repository.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            packages: Vec::new(),
        }
    }

    /// Appends a package.
    #[must_use]
    pub fn package(mut self, package: PackageSeed) -> Self {
        self.packages.push(package);
        self
    }
}

/// Builds a package seed with a description and installed size.
pub fn package(name: &str, version: &str, desc: &str, isize: i64) -> PackageSeed {
    let mut seed = PackageSeed::new(name, version);
    seed.desc = Some(desc.to_string());
    seed.isize = isize;
    seed.size = isize / 4;
    seed.arch = Some("x86_64".to_string());
    seed.filename = Some(format!("{name}-{version}-x86_64.pkg.tar.zst"));
    seed
}

/// A small `core` repository with several kernel packages.
pub fn core_repo() -> Repo {
    let mut linux = package("linux", "6.8.9.arch1-1", "The Linux kernel and modules", 137_000_000);
    linux.depends = vec![
        DependSeed::new("coreutils"),
        DependSeed::new("initramfs"),
        DependSeed::new("kmod"),
    ];
    linux.optdepends = vec![
        DependSeed::new("linux-firmware: firmware images needed for some devices"),
        DependSeed::new("wireless-regdb: to set the correct wireless channels of your country"),
    ];
    linux.provides = vec![
        DependSeed::new("KSMBD-MODULE"),
        DependSeed::new("VIRTUALBOX-GUEST-MODULES"),
        DependSeed::new("WIREGUARD-MODULE"),
    ];
    linux.files = vec![
        FileSeed { name: "usr/".into(), size: 0, mode: 0o755 },
        FileSeed { name: "usr/lib/modules/6.8.9-arch1-1/vmlinuz".into(), size: 13_316_608, mode: 0o644 },
    ];
    linux.backup = vec![(
        "etc/mkinitcpio.d/linux.preset".into(),
        "6f7e0a0b8c8c4b7f5e2b1c3d4a5f6e7d".into(),
    )];

    let mut lts = package("linux-lts", "6.6.30-1", "The LTS Linux kernel and modules", 127_500_000);
    lts.depends = linux.depends.clone();

    let mut headers = package(
        "linux-headers",
        "6.8.9.arch1-1",
        "Headers and scripts for building modules for the Linux kernel",
        48_200_000,
    );
    headers.depends = vec![DependSeed::new("pahole")];

    let mut mkinitcpio = package("mkinitcpio", "38.1-1", "Modular initramfs image creation utility", 140_000);
    mkinitcpio.provides = vec![DependSeed::new("initramfs")];

    Repo::new("core")
        .package(linux)
        .package(lts)
        .package(package(
            "linux-firmware",
            "20240510.b9d2bf23-1",
            "Firmware files for Linux",
            410_000_000,
        ))
        .package(headers)
        .package(package(
            "linux-api-headers",
            "6.8-1",
            "Kernel headers sanitized for use in userspace",
            6_300_000,
        ))
        .package(package("bash", "5.2.026-2", "The GNU Bourne Again shell", 9_300_000))
        .package(mkinitcpio)
        .package(package("booster", "0.11-4", "Fast and secure initramfs generator", 3_400_000))
}

/// A handle over a temporary root with seeded repositories.
///
/// Seeds are removed from the process-wide registry on drop.
pub struct TestHandle {
    handle: Handle,
    dir: TempDir,
}

impl TestHandle {
    /// Creates a handle with no repositories.
    pub fn new() -> Self {
        Self::with_repos(&[])
    }

    /// Seeds `repos` and creates the handle. Sync repositories are not
    /// registered yet; a repository named [`LOCAL_DB_NAME`] becomes the
    /// local database.
    pub fn with_repos(repos: &[Repo]) -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        for repo in repos {
            emulated::seed_database(dir.path(), &repo.name, repo.packages.clone());
        }
        let handle = Handle::new(dir.path(), dir.path()).expect("Failed to initialize handle");
        Self { handle, dir }
    }

    /// Creates a handle with [`core_repo`] seeded.
    pub fn core() -> Self {
        Self::with_repos(&[core_repo()])
    }

    /// Returns the temporary root.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Registers a seeded sync repository.
    pub fn register(&self, name: &str) -> Db<'_> {
        self.handle
            .register_sync_db(name, SigLevel::USE_DEFAULT)
            .expect("Failed to register sync database")
    }

    /// Sends a log line through the armed log callback.
    pub fn emit_log(&self, level: LogLevel, message: &str) -> bool {
        unsafe { emulated::emit_log(self.handle.as_ptr(), level.as_raw(), message) }
    }

    /// Asks a question that only has the generic answer field.
    pub fn ask(&self, kind: QuestionType) -> bool {
        unsafe { emulated::ask_generic(self.handle.as_ptr(), kind.as_raw()) != 0 }
    }

    /// Asks whether the ignored `pkg` should be installed.
    pub fn ask_install_ignorepkg(&self, pkg: &Package<'_>) -> bool {
        unsafe { emulated::ask_install_ignorepkg(self.handle.as_ptr(), pkg.as_ptr()) }
    }

    /// Asks whether `old` should be replaced by `new`.
    pub fn ask_replace(&self, old: &Package<'_>, new: &Package<'_>) -> bool {
        let newdb = new.db().map_or(ptr::null_mut(), |db| db.as_ptr());
        unsafe { emulated::ask_replace(self.handle.as_ptr(), old.as_ptr(), new.as_ptr(), newdb) }
    }

    /// Asks which of `providers` should satisfy `depstring`.
    pub fn ask_select_provider(&self, providers: &[Package<'_>], depstring: &str) -> i32 {
        unsafe {
            let mut list = ptr::null_mut();
            for pkg in providers {
                list = alpmbind_sys::alpm_list_add(list, pkg.as_ptr().cast());
            }
            let index = emulated::ask_select_provider(self.handle.as_ptr(), list, depstring);
            alpmbind_sys::alpm_list_free(list);
            index
        }
    }

    /// Asks whether a corrupted package file should be deleted.
    pub fn ask_corrupted(&self, filepath: &str) -> bool {
        unsafe { emulated::ask_corrupted(self.handle.as_ptr(), filepath) }
    }
}

impl Default for TestHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for TestHandle {
    type Target = Handle;

    fn deref(&self) -> &Self::Target {
        &self.handle
    }
}

impl Drop for TestHandle {
    fn drop(&mut self) {
        emulated::clear_seeds(self.dir.path());
    }
}

static CALLBACK_LOCK: parking_lot::Mutex<()> = parking_lot::const_mutex(());

/// Serializes tests that register callbacks.
///
/// Callback slots are process-wide, so tests in one binary that install
/// callbacks must not run concurrently.
pub fn callback_lock() -> parking_lot::MutexGuard<'static, ()> {
    CALLBACK_LOCK.lock()
}

/// An in-memory target for the default log sink.
///
/// Clones share one buffer, so a test keeps a clone and hands the other to
/// [`alpmbind::set_default_log_target`].
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<parking_lot::Mutex<Vec<u8>>>);

impl LogCapture {
    /// Creates an empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs a `tracing` subscriber honoring `RUST_LOG`, once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_fixture_registers() {
        let th = TestHandle::core();
        let core = th.register("core");
        assert_eq!(core.pkg_cache().len(), core_repo().packages.len());
        assert!(core.pkg("linux").is_ok());
    }

    #[test]
    fn local_repo_becomes_local_db() {
        let th = TestHandle::with_repos(&[Repo::new(LOCAL_DB_NAME).package(package("bash", "5.2.026-2", "shell", 1))]);
        assert_eq!(th.local_db().unwrap().pkg_cache().len(), 1);
    }

    #[test]
    fn hooks_without_callbacks_are_no_ops() {
        let th = TestHandle::core();
        let core = th.register("core");
        let linux = core.pkg("linux").unwrap();
        assert!(!th.ask_install_ignorepkg(&linux));
        assert_eq!(th.ask_select_provider(&[linux], "linux"), 0);
    }
}
