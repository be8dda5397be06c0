//! Question bridge.
//!
//! The library asks questions through one tagged union record. A
//! [`QuestionAny`] wraps that record; narrowing to a specific variant
//! checks the discriminant first and fails with
//! [`Error::WrongQuestionType`] on mismatch.
//!
//! All views of one question point at the same native memory. Setters
//! write straight into it, and the library reads the answer back once the
//! callback returns. Views are only valid during the callback.
//!
//! The callback receives no handle. Package and database views handed out
//! by a question are bound to the handle that owns the package, which is
//! the handle asking.

use std::ffi::c_int;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use alpmbind_sys as sys;

use crate::db::Db;
use crate::error::{Error, Result};
use crate::handle::HandleRef;
use crate::list::{AlpmList, PackageList};
use crate::marshal;
use crate::package::Package;
use crate::types::{Dependency, QuestionType};

/// The handle owning `pkg`, or a null reference for a null package.
unsafe fn owner(pkg: *mut sys::alpm_pkg_t) -> HandleRef {
    if pkg.is_null() {
        HandleRef::from_raw(ptr::null_mut())
    } else {
        HandleRef::from_raw(sys::alpm_pkg_get_handle(pkg))
    }
}

unsafe fn package<'q>(pkg: *mut sys::alpm_pkg_t) -> Option<Package<'q>> {
    (!pkg.is_null()).then(|| Package::from_raw(pkg, owner(pkg)))
}

/// The generic view of a question.
#[derive(Clone, Copy)]
pub struct QuestionAny<'q> {
    ptr: NonNull<sys::alpm_question_t>,
    _marker: PhantomData<&'q mut sys::alpm_question_t>,
}

impl<'q> QuestionAny<'q> {
    /// # Safety
    ///
    /// `ptr` must be the live question of the current callback invocation.
    pub(crate) unsafe fn from_raw(ptr: NonNull<sys::alpm_question_t>) -> Self {
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    fn raw(&self) -> *mut sys::alpm_question_t {
        self.ptr.as_ptr()
    }

    /// Returns the raw discriminant.
    pub fn raw_type(&self) -> c_int {
        // Safety: every variant starts with the discriminant.
        unsafe { (*self.raw()).type_ }
    }

    /// Returns the question type.
    pub fn kind(&self) -> Result<QuestionType> {
        QuestionType::try_from(self.raw_type())
    }

    /// Returns the generic answer.
    pub fn answer(&self) -> bool {
        // Safety: every variant has an answer word after the discriminant.
        unsafe { (*self.raw()).any.answer != 0 }
    }

    /// Sets the generic answer.
    pub fn set_answer(&self, answer: bool) {
        // Safety: as for `answer`.
        unsafe { (*self.raw()).any.answer = c_int::from(answer) }
    }

    fn narrow(&self, expected: QuestionType) -> Result<()> {
        let actual = self.kind()?;
        if actual == expected {
            Ok(())
        } else {
            Err(Error::WrongQuestionType { expected, actual })
        }
    }

    /// Narrows to the ignored-package question.
    pub fn install_ignore_pkg(&self) -> Result<QuestionInstallIgnorePkg<'q>> {
        self.narrow(QuestionType::InstallIgnorePkg)?;
        Ok(QuestionInstallIgnorePkg { inner: *self })
    }

    /// Narrows to the provider selection question.
    pub fn select_provider(&self) -> Result<QuestionSelectProvider<'q>> {
        self.narrow(QuestionType::SelectProvider)?;
        Ok(QuestionSelectProvider { inner: *self })
    }

    /// Narrows to the replacement question.
    pub fn replace(&self) -> Result<QuestionReplace<'q>> {
        self.narrow(QuestionType::ReplacePkg)?;
        Ok(QuestionReplace { inner: *self })
    }
}

impl fmt::Debug for QuestionAny<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuestionAny")
            .field("type", &self.raw_type())
            .field("answer", &self.answer())
            .finish()
    }
}

/// Install a package that is on the ignore list?
#[derive(Debug, Clone, Copy)]
pub struct QuestionInstallIgnorePkg<'q> {
    inner: QuestionAny<'q>,
}

impl<'q> QuestionInstallIgnorePkg<'q> {
    fn raw(&self) -> *mut sys::alpm_question_install_ignorepkg_t {
        // Safety: the discriminant was checked when narrowing.
        unsafe { ptr::addr_of_mut!((*self.inner.raw()).install_ignorepkg) }
    }

    /// Returns the answer.
    pub fn install(&self) -> bool {
        unsafe { (*self.raw()).install != 0 }
    }

    /// Answers the question.
    pub fn set_install(&self, install: bool) {
        unsafe { (*self.raw()).install = c_int::from(install) }
    }

    /// The ignored package.
    pub fn pkg(&self) -> Option<Package<'q>> {
        // Safety: the record is live for the callback.
        unsafe { package((*self.raw()).pkg) }
    }
}

/// Replace an installed package?
#[derive(Debug, Clone, Copy)]
pub struct QuestionReplace<'q> {
    inner: QuestionAny<'q>,
}

impl<'q> QuestionReplace<'q> {
    fn raw(&self) -> *mut sys::alpm_question_replace_t {
        // Safety: the discriminant was checked when narrowing.
        unsafe { ptr::addr_of_mut!((*self.inner.raw()).replace) }
    }

    /// Returns the answer.
    pub fn replace(&self) -> bool {
        unsafe { (*self.raw()).replace != 0 }
    }

    /// Answers the question.
    pub fn set_replace(&self, replace: bool) {
        unsafe { (*self.raw()).replace = c_int::from(replace) }
    }

    /// The installed package.
    pub fn old_pkg(&self) -> Option<Package<'q>> {
        unsafe { package((*self.raw()).oldpkg) }
    }

    /// The replacement.
    pub fn new_pkg(&self) -> Option<Package<'q>> {
        unsafe { package((*self.raw()).newpkg) }
    }

    /// The database the replacement comes from.
    pub fn new_db(&self) -> Option<Db<'q>> {
        // Safety: the record is live for the callback; the database
        // belongs to the same handle as the replacement.
        unsafe {
            let raw = *self.raw();
            if raw.newdb.is_null() {
                return None;
            }
            Some(Db::from_raw(raw.newdb, owner(raw.newpkg)))
        }
    }
}

/// Which package should satisfy a dependency?
#[derive(Debug, Clone, Copy)]
pub struct QuestionSelectProvider<'q> {
    inner: QuestionAny<'q>,
}

impl<'q> QuestionSelectProvider<'q> {
    fn raw(&self) -> *mut sys::alpm_question_select_provider_t {
        // Safety: the discriminant was checked when narrowing.
        unsafe { ptr::addr_of_mut!((*self.inner.raw()).select_provider) }
    }

    /// Index of the chosen provider.
    pub fn use_index(&self) -> i32 {
        unsafe { (*self.raw()).use_index }
    }

    /// Chooses a provider by index into [`providers`](Self::providers).
    pub fn set_use_index(&self, index: i32) {
        unsafe { (*self.raw()).use_index = index }
    }

    /// Candidate packages.
    pub fn providers(&self) -> PackageList<'q> {
        // Safety: the list and its packages are live for the callback, and
        // all candidates belong to the asking handle.
        unsafe {
            let head = (*self.raw()).providers;
            let first = if head.is_null() { ptr::null_mut() } else { (*head).data.cast() };
            AlpmList::borrowed(head, owner(first))
        }
    }

    /// The dependency being satisfied.
    pub fn dep(&self) -> Option<Dependency> {
        // Safety: a non-null depend record is live for the callback.
        unsafe {
            let depend = (*self.raw()).depend;
            (!depend.is_null()).then(|| marshal::depend_from_raw(depend))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(type_: c_int) -> sys::alpm_question_t {
        sys::alpm_question_t {
            select_provider: sys::alpm_question_select_provider_t {
                type_,
                use_index: 0,
                providers: ptr::null_mut(),
                depend: ptr::null_mut(),
            },
        }
    }

    fn view(record: &mut sys::alpm_question_t) -> QuestionAny<'_> {
        unsafe { QuestionAny::from_raw(NonNull::from(record)) }
    }

    #[test]
    fn narrowing_checks_discriminant() {
        let mut raw = record(sys::ALPM_QUESTION_SELECT_PROVIDER);
        let question = view(&mut raw);
        assert_eq!(question.kind().unwrap(), QuestionType::SelectProvider);

        let err = question.install_ignore_pkg().unwrap_err();
        assert!(matches!(
            err,
            Error::WrongQuestionType {
                expected: QuestionType::InstallIgnorePkg,
                actual: QuestionType::SelectProvider,
            }
        ));
        assert!(question.replace().is_err());
        assert!(question.select_provider().is_ok());
    }

    #[test]
    fn unknown_discriminant_never_narrows() {
        let mut raw = record(1 << 12);
        let question = view(&mut raw);
        assert!(matches!(question.kind(), Err(Error::UnknownValue { .. })));
        assert!(matches!(question.replace(), Err(Error::UnknownValue { .. })));
    }

    #[test]
    fn writes_land_in_shared_record() {
        let mut raw = record(sys::ALPM_QUESTION_SELECT_PROVIDER);
        {
            let question = view(&mut raw);
            question.select_provider().unwrap().set_use_index(2);
            assert_eq!(question.select_provider().unwrap().use_index(), 2);
            assert!(question.answer());
        }
        assert_eq!(unsafe { raw.select_provider.use_index }, 2);
    }

    #[test]
    fn generic_answer() {
        let mut raw = sys::alpm_question_t {
            any: sys::alpm_question_any_t {
                type_: sys::ALPM_QUESTION_IMPORT_KEY,
                answer: 0,
            },
        };
        let question = view(&mut raw);
        assert!(!question.answer());
        question.set_answer(true);
        assert!(question.answer());
        assert_eq!(unsafe { raw.any.answer }, 1);
    }

    #[test]
    fn null_references_are_absent() {
        let mut raw = sys::alpm_question_t {
            replace: sys::alpm_question_replace_t {
                type_: sys::ALPM_QUESTION_REPLACE_PKG,
                replace: 0,
                oldpkg: ptr::null_mut(),
                newpkg: ptr::null_mut(),
                newdb: ptr::null_mut(),
            },
        };
        let replace = view(&mut raw).replace().unwrap();
        assert!(replace.old_pkg().is_none());
        assert!(replace.new_pkg().is_none());
        assert!(replace.new_db().is_none());

        let mut raw = record(sys::ALPM_QUESTION_SELECT_PROVIDER);
        let select = view(&mut raw).select_provider().unwrap();
        assert!(select.dep().is_none());
        assert!(select.providers().is_empty());

        let mut raw = record(sys::ALPM_QUESTION_INSTALL_IGNOREPKG);
        assert!(view(&mut raw).install_ignore_pkg().unwrap().pkg().is_none());
    }
}
