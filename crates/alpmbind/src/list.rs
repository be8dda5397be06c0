//! Native list bridge.
//!
//! A native list is a chain of `alpm_list_t` nodes, each carrying one
//! untyped payload pointer. [`AlpmList`] wraps the head node and walks the
//! links lazily; every element is converted to its host type at the moment
//! it is visited.
//!
//! Lists handed out by getters are borrowed from the native record and
//! never free anything. Lists the native library allocates for the caller
//! (search results, sorted copies, computed names) own their nodes and are
//! released on drop with the native free functions.

use std::ffi::{c_char, c_int, c_void};
use std::fmt;
use std::marker::PhantomData;
use std::ptr;

use alpmbind_sys as sys;

use crate::db::Db;
use crate::error::{Error, ErrorCode, Result};
use crate::handle::{Handle, HandleRef};
use crate::marshal;
use crate::package::Package;
use crate::types::{BackupFile, Dependency};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ownership {
    /// The native record owns the list.
    Borrowed,
    /// The caller owns the nodes, not the payloads.
    Spine,
    /// The caller owns the nodes and the C-allocated payloads.
    Deep,
}

/// An untyped native list with its ownership mode.
pub(crate) struct RawList {
    head: *mut sys::alpm_list_t,
    ownership: Ownership,
}

impl RawList {
    pub(crate) fn borrowed(head: *mut sys::alpm_list_t) -> Self {
        Self {
            head,
            ownership: Ownership::Borrowed,
        }
    }

    /// Takes ownership of a list whose nodes were allocated for the caller.
    ///
    /// # Safety
    ///
    /// `head` must be null or a list no one else frees.
    pub(crate) unsafe fn owned_spine(head: *mut sys::alpm_list_t) -> Self {
        Self {
            head,
            ownership: Ownership::Spine,
        }
    }

    /// Takes ownership of a list and of its `malloc`ed payloads.
    ///
    /// # Safety
    ///
    /// As for [`RawList::owned_spine`]; every payload must be freeable
    /// with `free`.
    pub(crate) unsafe fn owned_deep(head: *mut sys::alpm_list_t) -> Self {
        Self {
            head,
            ownership: Ownership::Deep,
        }
    }

    pub(crate) fn head(&self) -> *mut sys::alpm_list_t {
        self.head
    }

    pub(crate) fn len(&self) -> usize {
        // Safety: the head is null or a live list.
        unsafe { sys::alpm_list_count(self.head) }
    }

    pub(crate) fn iter(&self) -> RawIter<'_> {
        RawIter {
            node: self.head,
            _list: PhantomData,
        }
    }

    /// Visits every payload in list order, stopping at the first error.
    pub(crate) fn for_each<E>(
        &self,
        mut visit: impl FnMut(*mut c_void) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        for data in self.iter() {
            visit(data)?;
        }
        Ok(())
    }
}

impl Drop for RawList {
    fn drop(&mut self) {
        if self.head.is_null() {
            return;
        }
        // Safety: owned lists were handed to us by the native side.
        unsafe {
            match self.ownership {
                Ownership::Borrowed => {}
                Ownership::Spine => sys::alpm_list_free(self.head),
                Ownership::Deep => {
                    sys::alpm_list_free_inner(self.head, Some(libc::free));
                    sys::alpm_list_free(self.head);
                }
            }
        }
    }
}

/// Walks payload pointers from head to tail.
pub(crate) struct RawIter<'l> {
    node: *const sys::alpm_list_t,
    _list: PhantomData<&'l RawList>,
}

impl Iterator for RawIter<'_> {
    type Item = *mut c_void;

    fn next(&mut self) -> Option<Self::Item> {
        if self.node.is_null() {
            return None;
        }
        // Safety: nodes stay linked while the list is borrowed.
        unsafe {
            let node = &*self.node;
            self.node = node.next;
            Some(node.data)
        }
    }
}

mod sealed {
    use std::ffi::c_void;

    use crate::handle::HandleRef;

    pub trait FromPayload: Sized {
        /// # Safety
        ///
        /// `data` must be a payload of the matching native type.
        unsafe fn from_payload(data: *mut c_void, handle: HandleRef) -> Self;
    }
}

/// Element types a native list can be read as.
pub trait ListItem: sealed::FromPayload {}

impl sealed::FromPayload for String {
    unsafe fn from_payload(data: *mut c_void, _: HandleRef) -> Self {
        marshal::from_cstr(data.cast())
    }
}
impl ListItem for String {}

impl sealed::FromPayload for Dependency {
    unsafe fn from_payload(data: *mut c_void, _: HandleRef) -> Self {
        marshal::depend_from_raw(data.cast())
    }
}
impl ListItem for Dependency {}

impl sealed::FromPayload for BackupFile {
    unsafe fn from_payload(data: *mut c_void, _: HandleRef) -> Self {
        marshal::backup_from_raw(data.cast())
    }
}
impl ListItem for BackupFile {}

impl sealed::FromPayload for Package<'_> {
    unsafe fn from_payload(data: *mut c_void, handle: HandleRef) -> Self {
        Package::from_raw(data.cast(), handle)
    }
}
impl ListItem for Package<'_> {}

impl sealed::FromPayload for Db<'_> {
    unsafe fn from_payload(data: *mut c_void, handle: HandleRef) -> Self {
        Db::from_raw(data.cast(), handle)
    }
}
impl ListItem for Db<'_> {}

/// A native list read as `T`, valid while the handle `'a` lives.
pub struct AlpmList<'a, T> {
    raw: RawList,
    handle: HandleRef,
    _marker: PhantomData<(&'a Handle, fn() -> T)>,
}

/// Strings, e.g. licenses, groups or servers.
pub type StringList<'a> = AlpmList<'a, String>;
/// Package views.
pub type PackageList<'a> = AlpmList<'a, Package<'a>>;
/// Database views.
pub type DbList<'a> = AlpmList<'a, Db<'a>>;
/// Dependencies, conflicts, provisions and replacements.
pub type DependList<'a> = AlpmList<'a, Dependency>;
/// Backup file records.
pub type BackupList<'a> = AlpmList<'a, BackupFile>;

impl<'a, T: ListItem> AlpmList<'a, T> {
    pub(crate) fn new(raw: RawList, handle: HandleRef) -> Self {
        Self {
            raw,
            handle,
            _marker: PhantomData,
        }
    }

    pub(crate) fn borrowed(head: *mut sys::alpm_list_t, handle: HandleRef) -> Self {
        Self::new(RawList::borrowed(head), handle)
    }

    /// Number of elements; walks the whole list.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true for the empty (null) list.
    pub fn is_empty(&self) -> bool {
        self.raw.head().is_null()
    }

    /// Iterates in list order, converting each element when reached.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            raw: self.raw.iter(),
            handle: self.handle,
            _marker: PhantomData,
        }
    }

    /// Calls `visit` once per element in list order.
    ///
    /// The walk stops at the first error, which is returned. An empty list
    /// succeeds without calling `visit`.
    pub fn for_each<E>(
        &self,
        mut visit: impl FnMut(T) -> std::result::Result<(), E>,
    ) -> std::result::Result<(), E> {
        let handle = self.handle;
        // Safety: payloads of this list are of type T.
        self.raw
            .for_each(|data| visit(unsafe { T::from_payload(data, handle) }))
    }

    /// Converts every element into a vector.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Returns the head node.
    pub fn as_ptr(&self) -> *const sys::alpm_list_t {
        self.raw.head()
    }
}

impl<'a> PackageList<'a> {
    /// Returns a new list ordered by installed size, largest first.
    ///
    /// The node spine is copied before the native merge sort runs, so this
    /// list keeps its order.
    pub fn sort_by_size(&self) -> PackageList<'a> {
        // Safety: copying and sorting only relinks the fresh spine.
        unsafe {
            let copy = sys::alpm_list_copy(self.raw.head());
            let count = sys::alpm_list_count(copy);
            let sorted = sys::alpm_list_msort(copy, count, Some(cmp_isize_desc));
            Self::new(RawList::owned_spine(sorted), self.handle)
        }
    }
}

unsafe extern "C" fn cmp_isize_desc(a: *const c_void, b: *const c_void) -> c_int {
    let a = sys::alpm_pkg_get_isize(a.cast_mut().cast());
    let b = sys::alpm_pkg_get_isize(b.cast_mut().cast());
    b.cmp(&a) as c_int
}

impl<T: ListItem + fmt::Debug> fmt::Debug for AlpmList<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'l, T: ListItem> IntoIterator for &'l AlpmList<'_, T> {
    type Item = T;
    type IntoIter = Iter<'l, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`AlpmList`].
pub struct Iter<'l, T> {
    raw: RawIter<'l>,
    handle: HandleRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T: ListItem> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let data = self.raw.next()?;
        // Safety: payloads of this list are of type T.
        Some(unsafe { T::from_payload(data, self.handle) })
    }
}

/// A native string list built from host strings.
///
/// Each string is copied with the C allocator. Dropping the list frees the
/// copies; [`NativeStringList::into_raw`] hands them to the native side.
pub(crate) struct NativeStringList {
    head: *mut sys::alpm_list_t,
}

impl NativeStringList {
    pub(crate) fn new<I, S>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self {
            head: ptr::null_mut(),
        };
        for item in items {
            let item = marshal::to_cstring(item.as_ref())?;
            // Safety: strdup copies into C memory the list now owns.
            unsafe { list.push(libc::strdup(item.as_ptr()))? };
        }
        Ok(list)
    }

    /// Appends a C string the list takes over. A null copy is a failed
    /// allocation.
    unsafe fn push(&mut self, copy: *mut c_char) -> Result<()> {
        if copy.is_null() {
            return Err(Error::from_code(ErrorCode::MEMORY));
        }
        self.head = sys::alpm_list_add(self.head, copy.cast());
        Ok(())
    }

    pub(crate) fn as_ptr(&self) -> *const sys::alpm_list_t {
        self.head
    }

    /// Gives up ownership of the nodes and strings.
    pub(crate) fn into_raw(self) -> *mut sys::alpm_list_t {
        let head = self.head;
        std::mem::forget(self);
        head
    }
}

impl Drop for NativeStringList {
    fn drop(&mut self) {
        // Safety: built by `new` from strdup'd payloads.
        drop(unsafe { RawList::owned_deep(self.head) });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn strings(list: &StringList<'_>) -> Vec<String> {
        let mut out = Vec::new();
        list.for_each(|s| {
            out.push(s);
            Ok::<_, ()>(())
        })
        .unwrap();
        out
    }

    fn owned(native: NativeStringList) -> StringList<'static> {
        // Safety: the native list is deep-owned C memory.
        AlpmList::new(unsafe { RawList::owned_deep(native.into_raw()) }, HandleRef::null())
    }

    #[test]
    fn null_head_is_empty() {
        let list: StringList<'_> = AlpmList::borrowed(ptr::null_mut(), HandleRef::null());
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        let mut visits = 0;
        list.for_each(|_| {
            visits += 1;
            Ok::<_, ()>(())
        })
        .unwrap();
        assert_eq!(visits, 0);
    }

    #[test]
    fn for_each_stops_at_first_error() {
        let list = owned(NativeStringList::new(["a", "b", "c"]).unwrap());
        let mut seen = Vec::new();
        let result = list.for_each(|s| {
            if s == "b" {
                return Err(s);
            }
            seen.push(s);
            Ok(())
        });
        assert_eq!(result, Err("b".to_string()));
        assert_eq!(seen, ["a"]);
    }

    #[test]
    fn native_string_list_rejects_nul() {
        assert!(NativeStringList::new(["ok", "bad\0"]).is_err());
    }

    #[test]
    fn failed_copy_is_out_of_memory() {
        let mut native = NativeStringList::new(["kept"]).unwrap();
        let err = unsafe { native.push(ptr::null_mut()) }.unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MEMORY));
        assert_eq!(owned(native).to_vec(), ["kept"]);
    }

    #[test]
    fn borrowed_list_is_not_freed() {
        let native = NativeStringList::new(["x", "y"]).unwrap();
        {
            let view: StringList<'_> =
                AlpmList::borrowed(native.as_ptr().cast_mut(), HandleRef::null());
            assert_eq!(view.to_vec(), ["x", "y"]);
        }
        let again: StringList<'_> =
            AlpmList::borrowed(native.as_ptr().cast_mut(), HandleRef::null());
        assert_eq!(again.len(), 2);
    }

    proptest! {
        #[test]
        fn walk_preserves_native_order(items in proptest::collection::vec("[a-z0-9.-]{0,12}", 0..32)) {
            let list = owned(NativeStringList::new(&items).unwrap());
            prop_assert_eq!(list.len(), items.len());
            prop_assert_eq!(strings(&list), items.clone());
            prop_assert_eq!(list.iter().collect::<Vec<_>>(), items);
        }
    }
}
