//! Host integration boundary.
//!
//! The hosting window's message loop participates in exactly three ways:
//! answering the client's identity-query message with a provider, fetching
//! the window's native host provider once, and tearing providers down
//! before the window goes away. Everything else about the window (creation,
//! painting, input) is outside the bridge.
//!
//! Teardown order matters: call [`ProviderRef::disconnect`] while the
//! window still exists, then destroy the window, and run
//! [`disconnect_all_providers`] if the whole process is withdrawing
//! accessibility support.
//!
//! [`ProviderRef::disconnect`]: crate::ProviderRef::disconnect

use std::ffi::c_void;
use std::ptr::{self, NonNull};

use horizon_uia_core::{HResult, runtime, unknown};

use crate::error::{Result, UiaError};
use crate::provider::ProviderRef;

/// The identity-query window message (`WM_GETOBJECT`).
pub const WM_GETOBJECT: u32 = 0x003D;

/// The `lParam` value selecting the UI Automation root object.
pub const UIA_ROOT_OBJECT_ID: i32 = -25;

/// Whether a window message is the client asking for our root provider.
pub fn is_identity_query(message: u32, lparam: isize) -> bool {
    message == WM_GETOBJECT && lparam as i32 == UIA_ROOT_OBJECT_ID
}

/// Answer an identity query with the given provider.
///
/// Call from the window procedure on [`is_identity_query`] messages and
/// return the result as the message's `LRESULT`. A disconnected provider
/// answers zero, which lets default window processing take over.
pub fn return_provider(
    hwnd: usize,
    wparam: usize,
    lparam: isize,
    provider: &ProviderRef,
) -> isize {
    if provider.is_disconnected() {
        return 0;
    }
    // SAFETY: the caller's reference pins the provider across the call; the
    // platform takes its own reference before returning.
    unsafe { runtime().return_raw_element_provider(hwnd, wparam, lparam, provider.simple_ptr()) }
}

/// An owned reference to a window's native host provider.
pub struct HostProvider {
    ptr: NonNull<c_void>,
}

impl HostProvider {
    /// The raw interface pointer. Borrowed; this handle keeps the
    /// reference.
    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }
}

impl Drop for HostProvider {
    fn drop(&mut self) {
        // SAFETY: the handle owns exactly one reference from the platform.
        unsafe { unknown::release(self.ptr.as_ptr()) };
    }
}

/// Fetch the native host provider for a window. Call once per window and
/// keep the handle for the window's lifetime.
pub fn host_provider_for(hwnd: usize) -> Result<HostProvider> {
    let mut out = ptr::null_mut();
    // SAFETY: out is a writable local; on success the platform hands over
    // an owned reference.
    let status = unsafe { runtime().host_provider_from_hwnd(hwnd, &mut out) };
    status.ok().map_err(|status| UiaError::PlatformCallFailure {
        call: "UiaHostProviderFromHwnd",
        status,
    })?;
    NonNull::new(out)
        .map(|ptr| HostProvider { ptr })
        .ok_or(UiaError::PlatformCallFailure {
            call: "UiaHostProviderFromHwnd",
            status: HResult::NULL_POINTER,
        })
}

/// Process-wide sweep invalidating every outstanding provider.
///
/// For abrupt whole-process teardown; individual windows should prefer
/// per-provider disconnects.
pub fn disconnect_all_providers() -> Result<()> {
    // SAFETY: the sweep takes no arguments; outstanding external
    // references become unusable, which is the caller's stated intent.
    let status = unsafe { runtime().disconnect_all() };
    status.ok().map_err(|status| UiaError::PlatformCallFailure {
        call: "UiaDisconnectAllProviders",
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderBuilder;

    struct Pane;

    impl crate::provider::ProviderHandler for Pane {}

    #[test]
    fn identity_query_detection() {
        assert!(is_identity_query(WM_GETOBJECT, UIA_ROOT_OBJECT_ID as isize));
        assert!(!is_identity_query(WM_GETOBJECT, 0));
        assert!(!is_identity_query(0x0010, UIA_ROOT_OBJECT_ID as isize));
    }

    #[test]
    fn connected_provider_answers_the_query() {
        let provider = ProviderBuilder::new(Pane).window(0x5150).build();
        let answer = return_provider(0x5150, 0, UIA_ROOT_OBJECT_ID as isize, &provider);
        assert_ne!(answer, 0);
    }

    #[test]
    fn disconnected_provider_answers_zero() {
        let provider = ProviderBuilder::new(Pane).build();
        provider.disconnect().unwrap();
        let answer = return_provider(0x5150, 0, UIA_ROOT_OBJECT_ID as isize, &provider);
        assert_eq!(answer, 0);
    }

    #[test]
    fn sweep_reports_a_status() {
        // On the loopback runtime the sweep is recorded and succeeds.
        disconnect_all_providers().unwrap();
    }

    #[test]
    fn host_provider_miss_is_an_error() {
        // Only meaningful on the loopback runtime, which has no native
        // host to hand out.
        if runtime().journal().is_none() {
            return;
        }
        assert!(host_provider_for(0x5150).is_err());
    }
}
