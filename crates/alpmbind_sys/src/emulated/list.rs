//! List primitives and C-allocator helpers.
//!
//! Nodes and strings come from `calloc`/`strdup` so that callers may free
//! them exactly as they would free libalpm allocations.

use std::cmp::Ordering;
use std::ffi::{c_char, c_int, c_void, CString};
use std::ptr;

use crate::types::*;

/// Copies a Rust string into a `strdup` allocation. Interior NULs are
/// dropped.
pub(crate) fn dup_str(s: &str) -> *mut c_char {
    let owned = CString::new(s.replace('\0', "")).unwrap_or_default();
    // Safety: `owned` is a valid NUL-terminated string.
    unsafe { libc::strdup(owned.as_ptr()) }
}

/// Like [`dup_str`], mapping `None` to null.
pub(crate) fn dup_opt(s: Option<&str>) -> *mut c_char {
    s.map_or(ptr::null_mut(), dup_str)
}

/// Frees a string previously produced by [`dup_str`]; null is ignored.
pub(crate) unsafe fn free_str(s: *mut c_char) {
    if !s.is_null() {
        libc::free(s.cast());
    }
}

/// Builds a list whose payloads are `strdup` copies of `items`.
pub(crate) fn string_list<S: AsRef<str>>(items: &[S]) -> *mut alpm_list_t {
    let mut list = ptr::null_mut();
    for item in items {
        // Safety: `list` is either null or a list built here.
        list = unsafe { alpm_list_add(list, dup_str(item.as_ref()).cast()) };
    }
    list
}

/// Frees a list and its payloads with `free`.
pub(crate) unsafe fn free_string_list(list: *mut alpm_list_t) {
    alpm_list_free_inner(list, Some(libc::free));
    alpm_list_free(list);
}

/// Iterates over the payloads of a list.
pub(crate) unsafe fn payloads(list: *const alpm_list_t) -> Vec<*mut c_void> {
    let mut out = Vec::new();
    let mut node = list;
    while !node.is_null() {
        out.push((*node).data);
        node = (*node).next;
    }
    out
}

/// Appends `data` to `list` and returns the (possibly new) head.
pub unsafe extern "C" fn alpm_list_add(list: *mut alpm_list_t, data: *mut c_void) -> *mut alpm_list_t {
    let node = libc::calloc(1, std::mem::size_of::<alpm_list_t>()).cast::<alpm_list_t>();
    if node.is_null() {
        return list;
    }
    (*node).data = data;
    (*node).next = ptr::null_mut();

    if list.is_null() {
        (*node).prev = node;
        return node;
    }

    let tail = (*list).prev;
    (*tail).next = node;
    (*node).prev = tail;
    (*list).prev = node;
    list
}

/// Shallow copy: new nodes, same payloads.
pub unsafe extern "C" fn alpm_list_copy(list: *const alpm_list_t) -> *mut alpm_list_t {
    let mut copy = ptr::null_mut();
    for data in payloads(list) {
        copy = alpm_list_add(copy, data);
    }
    copy
}

/// Number of nodes.
pub unsafe extern "C" fn alpm_list_count(list: *const alpm_list_t) -> usize {
    let mut count = 0;
    let mut node = list;
    while !node.is_null() {
        count += 1;
        node = (*node).next;
    }
    count
}

/// Stable merge sort that relinks the existing nodes.
pub unsafe extern "C" fn alpm_list_msort(
    list: *mut alpm_list_t,
    n: usize,
    fn_: alpm_list_fn_cmp,
) -> *mut alpm_list_t {
    let Some(cmp) = fn_ else {
        return list;
    };
    if n < 2 || list.is_null() {
        return list;
    }

    let mut nodes = Vec::with_capacity(n);
    let mut node = list;
    while !node.is_null() {
        nodes.push(node);
        node = (*node).next;
    }

    nodes.sort_by(|a, b| {
        let r: c_int = cmp((**a).data, (**b).data);
        r.cmp(&0)
    });

    let len = nodes.len();
    for (i, &node) in nodes.iter().enumerate() {
        (*node).next = if i + 1 < len { nodes[i + 1] } else { ptr::null_mut() };
        (*node).prev = if i == 0 { nodes[len - 1] } else { nodes[i - 1] };
    }
    nodes[0]
}

/// Frees the nodes, not the payloads.
pub unsafe extern "C" fn alpm_list_free(list: *mut alpm_list_t) {
    let mut node = list;
    while !node.is_null() {
        let next = (*node).next;
        libc::free(node.cast());
        node = next;
    }
}

/// Calls `fn_` on every non-null payload.
pub unsafe extern "C" fn alpm_list_free_inner(list: *mut alpm_list_t, fn_: alpm_list_fn_free) {
    let Some(free) = fn_ else {
        return;
    };
    for data in payloads(list) {
        if !data.is_null() {
            free(data);
        }
    }
}

/// Orders C strings like `strcmp`.
pub(crate) unsafe fn cmp_cstr(a: *const c_char, b: *const c_char) -> Ordering {
    libc::strcmp(a, b).cmp(&0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    unsafe fn names(list: *const alpm_list_t) -> Vec<String> {
        payloads(list)
            .into_iter()
            .map(|p| CStr::from_ptr(p.cast()).to_string_lossy().into_owned())
            .collect()
    }

    unsafe extern "C" fn by_name(a: *const c_void, b: *const c_void) -> c_int {
        libc::strcmp(a.cast(), b.cast())
    }

    #[test]
    fn add_keeps_tail_link() {
        unsafe {
            let list = string_list(&["a", "b", "c"]);
            assert_eq!(alpm_list_count(list), 3);
            assert_eq!(names((*list).prev), vec!["c"]);
            free_string_list(list);
        }
    }

    #[test]
    fn msort_relinks_nodes() {
        unsafe {
            let list = string_list(&["pear", "apple", "fig"]);
            let sorted = alpm_list_msort(list, 3, Some(by_name));
            assert_eq!(names(sorted), vec!["apple", "fig", "pear"]);
            assert_eq!(names((*sorted).prev), vec!["pear"]);
            free_string_list(sorted);
        }
    }

    #[test]
    fn copy_shares_payloads() {
        unsafe {
            let list = string_list(&["x", "y"]);
            let copy = alpm_list_copy(list);
            assert_eq!(payloads(list), payloads(copy));
            alpm_list_free(copy);
            free_string_list(list);
        }
    }

    #[test]
    fn null_list_is_empty() {
        unsafe {
            assert_eq!(alpm_list_count(ptr::null()), 0);
            assert!(alpm_list_copy(ptr::null()).is_null());
            alpm_list_free(ptr::null_mut());
        }
    }
}
