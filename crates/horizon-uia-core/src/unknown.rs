//! The IUnknown lifetime-management table layout.
//!
//! Slots 0-2 of every exposed interface table are QueryInterface, AddRef and
//! Release, in that order. The layout here is an external contract: an
//! external native caller invokes these entries by raw address through the
//! table, so the struct below must never be reordered.

use std::ffi::c_void;

use static_assertions::const_assert_eq;

use crate::guid::Guid;
use crate::hresult::HResult;

/// `QueryInterface` entry: negotiate an interface by identity.
pub type QueryInterfaceFn =
    unsafe extern "system" fn(this: *mut c_void, iid: *const Guid, out: *mut *mut c_void) -> HResult;

/// `AddRef` entry: increment the reference count, returning the new count.
pub type AddRefFn = unsafe extern "system" fn(this: *mut c_void) -> u32;

/// `Release` entry: decrement the reference count, returning the new count.
pub type ReleaseFn = unsafe extern "system" fn(this: *mut c_void) -> u32;

/// The three universal lifetime-management slots.
///
/// Every capability table embeds this as its first field so that any
/// interface pointer can be treated as an IUnknown pointer.
#[repr(C)]
pub struct IUnknownVtbl {
    pub query_interface: QueryInterfaceFn,
    pub add_ref: AddRefFn,
    pub release: ReleaseFn,
}

const_assert_eq!(
    std::mem::size_of::<IUnknownVtbl>(),
    3 * std::mem::size_of::<usize>()
);

/// Call `AddRef` on a raw interface pointer.
///
/// # Safety
///
/// `punk` must be a live interface pointer whose first pointer-sized word is
/// a valid vtable address with the IUnknown slots in front.
pub unsafe fn add_ref(punk: *mut c_void) -> u32 {
    let vtbl = unsafe { *(punk as *mut *const IUnknownVtbl) };
    unsafe { ((*vtbl).add_ref)(punk) }
}

/// Call `Release` on a raw interface pointer.
///
/// # Safety
///
/// Same contract as [`add_ref`]; additionally this must be the caller's last
/// use of the pointer unless another reference is still held.
pub unsafe fn release(punk: *mut c_void) -> u32 {
    let vtbl = unsafe { *(punk as *mut *const IUnknownVtbl) };
    unsafe { ((*vtbl).release)(punk) }
}
