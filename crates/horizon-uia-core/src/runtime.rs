//! The process-wide entry-point registry.
//!
//! The platform entry points behind the bridge (string/array services and
//! the accessibility raise/return/disconnect calls) are resolved once and
//! cached for the life of the process. They are exposed through the
//! [`UiaRuntime`] trait rather than ad hoc globals so the whole surface can
//! be faked in tests: install a [`loopback::LoopbackRuntime`] and every
//! marshaling call and raised event lands in an inspectable journal.
//!
//! The registry is built lazily at first use; [`install_runtime`] may be
//! called earlier to override the platform default.

use std::ffi::c_void;

use parking_lot::Mutex;

use crate::hresult::HResult;
use crate::safearray::SafeArrayHeader;
use crate::variant::{UiaChangeInfo, VarType, Variant};

pub mod loopback;

#[cfg(target_os = "windows")]
pub mod dll;

/// The resolved platform entry points, as one capability interface.
///
/// Raw pointers and numeric ids cross this boundary; the typed layers above
/// own all interpretation. Implementations must be callable from whichever
/// thread the external accessibility subsystem chooses.
pub trait UiaRuntime: Send + Sync {
    /// Allocate platform string storage; null on allocation failure.
    fn alloc_string(&self, value: &str) -> *mut u16;

    /// Free a string allocated by [`alloc_string`](Self::alloc_string) or
    /// received from the platform.
    ///
    /// # Safety
    ///
    /// `bstr` must be a live platform string allocation, freed at most once.
    unsafe fn free_string(&self, bstr: *mut u16);

    /// Create a one-dimensional array; null on failure.
    fn create_vector(
        &self,
        element_type: VarType,
        lower_bound: i32,
        len: u32,
    ) -> *mut SafeArrayHeader;

    /// Store one element at `index` (declared-bounds coordinates).
    ///
    /// # Safety
    ///
    /// `array` must be live; `value` must point at element-sized storage.
    unsafe fn put_element(
        &self,
        array: *mut SafeArrayHeader,
        index: i32,
        value: *const c_void,
    ) -> HResult;

    /// Destroy an array created by [`create_vector`](Self::create_vector).
    ///
    /// # Safety
    ///
    /// `array` must be live and is invalid after a successful call.
    unsafe fn destroy_array(&self, array: *mut SafeArrayHeader) -> HResult;

    /// Answer an identity-query window message with a provider.
    ///
    /// # Safety
    ///
    /// `provider` must be a live simple-provider interface pointer.
    unsafe fn return_raw_element_provider(
        &self,
        hwnd: usize,
        wparam: usize,
        lparam: isize,
        provider: *mut c_void,
    ) -> isize;

    /// Query the native host provider for a window.
    ///
    /// # Safety
    ///
    /// `out` must be writable; on success it receives an owned interface
    /// pointer the caller must release.
    unsafe fn host_provider_from_hwnd(&self, hwnd: usize, out: *mut *mut c_void) -> HResult;

    /// Raise a fire-and-forget automation event.
    ///
    /// # Safety
    ///
    /// `provider` must be a live simple-provider interface pointer.
    unsafe fn raise_automation_event(&self, provider: *mut c_void, event_id: u32) -> HResult;

    /// Raise a property-changed event. The variants stay owned by the
    /// caller.
    ///
    /// # Safety
    ///
    /// `provider` live; `old_value`/`new_value` must point at live records.
    unsafe fn raise_property_changed(
        &self,
        provider: *mut c_void,
        property_id: u32,
        old_value: *const Variant,
        new_value: *const Variant,
    ) -> HResult;

    /// Raise a structure-changed event with a runtime-id payload.
    ///
    /// # Safety
    ///
    /// `provider` live; `runtime_id` must point at `runtime_id_len` integers
    /// (it may be null when the length is zero).
    unsafe fn raise_structure_changed(
        &self,
        provider: *mut c_void,
        change_type: u32,
        runtime_id: *const i32,
        runtime_id_len: i32,
    ) -> HResult;

    /// Raise an out-of-band notification with display and activity strings.
    ///
    /// # Safety
    ///
    /// `provider` live; `display` and `activity_id` must be live platform
    /// strings for the duration of the call.
    unsafe fn raise_notification(
        &self,
        provider: *mut c_void,
        kind: u32,
        processing: u32,
        display: *const u16,
        activity_id: *const u16,
    ) -> HResult;

    /// Raise a bulk-changes event.
    ///
    /// # Safety
    ///
    /// `provider` live; `changes` must point at `count` records.
    unsafe fn raise_changes(
        &self,
        provider: *mut c_void,
        count: i32,
        changes: *const UiaChangeInfo,
    ) -> HResult;

    /// Invalidate one provider's outstanding external references.
    ///
    /// # Safety
    ///
    /// `provider` must be a live simple-provider interface pointer.
    unsafe fn disconnect_provider(&self, provider: *mut c_void) -> HResult;

    /// Process-wide sweep invalidating every outstanding provider.
    ///
    /// # Safety
    ///
    /// Outstanding external references become unusable after this call.
    unsafe fn disconnect_all(&self) -> HResult;

    /// The recorded-event journal, when this runtime keeps one.
    ///
    /// Only the loopback runtime returns `Some`; production runtimes forward
    /// to the platform and record nothing.
    fn journal(&self) -> Option<&loopback::EventJournal> {
        None
    }
}

/// The installed registry (lazy initialized).
static RUNTIME: Mutex<Option<&'static dyn UiaRuntime>> = Mutex::new(None);

/// Install a registry before first use, overriding the platform default.
///
/// Returns `false` (and drops nothing already installed) if the registry was
/// installed or lazily initialized earlier.
pub fn install_runtime(runtime: Box<dyn UiaRuntime>) -> bool {
    let mut guard = RUNTIME.lock();
    if guard.is_some() {
        return false;
    }
    *guard = Some(Box::leak(runtime));
    true
}

/// The process-wide entry-point registry, built at first use.
pub fn runtime() -> &'static dyn UiaRuntime {
    let mut guard = RUNTIME.lock();
    match *guard {
        Some(rt) => rt,
        None => {
            let rt = default_runtime();
            *guard = Some(rt);
            rt
        }
    }
}

#[cfg(target_os = "windows")]
fn default_runtime() -> &'static dyn UiaRuntime {
    match dll::DllRuntime::new() {
        Ok(rt) => {
            tracing::debug!(
                target: "horizon_uia_core::runtime",
                "platform entry points resolved"
            );
            Box::leak(Box::new(rt))
        }
        Err(err) => {
            // Accessibility degrades to a no-op rather than failing the
            // hosting application.
            tracing::error!(
                target: "horizon_uia_core::runtime",
                "failed to resolve platform entry points, accessibility disabled: {err}"
            );
            Box::leak(Box::new(loopback::LoopbackRuntime::new()))
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn default_runtime() -> &'static dyn UiaRuntime {
    tracing::debug!(
        target: "horizon_uia_core::runtime",
        "no platform accessibility on this target, using loopback runtime"
    );
    Box::leak(Box::new(loopback::LoopbackRuntime::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lazy_registry_is_stable() {
        let a = runtime() as *const dyn UiaRuntime;
        let b = runtime() as *const dyn UiaRuntime;
        assert_eq!(a as *const u8 as usize, b as *const u8 as usize);
    }

    #[test]
    fn install_after_init_is_rejected() {
        let _ = runtime();
        assert!(!install_runtime(Box::new(loopback::LoopbackRuntime::new())));
    }
}
