//! DLL-backed registry for Windows.
//!
//! Resolves the oleaut32 and uiautomationcore entry points once, at registry
//! construction, and calls them by cached address thereafter. Resolution
//! failure surfaces as a `PlatformCall` error; the caller decides whether to
//! degrade to the loopback runtime.

use std::ffi::c_void;
use std::mem;

use windows::Win32::Foundation::HMODULE;
use windows::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryW};
use windows::core::{PCSTR, PCWSTR, s, w};

use crate::error::{ComError, ComResult};
use crate::hresult::HResult;
use crate::safearray::SafeArrayHeader;
use crate::variant::{UiaChangeInfo, VarType, Variant};

use super::UiaRuntime;

type SysAllocStringFn = unsafe extern "system" fn(*const u16) -> *mut u16;
type SysFreeStringFn = unsafe extern "system" fn(*mut u16);
type SafeArrayCreateVectorFn =
    unsafe extern "system" fn(u16, i32, u32) -> *mut SafeArrayHeader;
type SafeArrayPutElementFn =
    unsafe extern "system" fn(*mut SafeArrayHeader, *const i32, *const c_void) -> HResult;
type SafeArrayDestroyFn = unsafe extern "system" fn(*mut SafeArrayHeader) -> HResult;
type UiaReturnRawElementProviderFn =
    unsafe extern "system" fn(usize, usize, isize, *mut c_void) -> isize;
type UiaHostProviderFromHwndFn =
    unsafe extern "system" fn(usize, *mut *mut c_void) -> HResult;
type UiaRaiseAutomationEventFn = unsafe extern "system" fn(*mut c_void, i32) -> HResult;
type UiaRaisePropertyChangedFn =
    unsafe extern "system" fn(*mut c_void, i32, *const Variant, *const Variant) -> HResult;
type UiaRaiseStructureChangedFn =
    unsafe extern "system" fn(*mut c_void, i32, *const i32, i32) -> HResult;
type UiaRaiseNotificationFn =
    unsafe extern "system" fn(*mut c_void, i32, i32, *const u16, *const u16) -> HResult;
type UiaRaiseChangesFn =
    unsafe extern "system" fn(*mut c_void, i32, *const UiaChangeInfo) -> HResult;
type UiaDisconnectProviderFn = unsafe extern "system" fn(*mut c_void) -> HResult;
type UiaDisconnectAllFn = unsafe extern "system" fn() -> HResult;

/// Load a system library, failing with a `PlatformCall` error.
fn load_library(name: PCWSTR) -> ComResult<HMODULE> {
    // SAFETY: name is a valid null-terminated wide string literal.
    unsafe { LoadLibraryW(name) }.map_err(|err| ComError::PlatformCall {
        call: "LoadLibraryW",
        status: HResult(err.code().0),
    })
}

/// Resolve one export, failing with a `PlatformCall` error.
fn resolve(module: HMODULE, name: PCSTR) -> ComResult<*const c_void> {
    // SAFETY: module is a loaded library and name a null-terminated literal.
    match unsafe { GetProcAddress(module, name) } {
        Some(proc) => Ok(proc as *const c_void),
        None => Err(ComError::PlatformCall {
            call: "GetProcAddress",
            status: HResult::FAIL,
        }),
    }
}

macro_rules! bind {
    ($module:expr, $name:literal, $ty:ty) => {{
        let proc = resolve($module, s!($name))?;
        // SAFETY: the export's documented signature matches $ty.
        unsafe { mem::transmute::<*const c_void, $ty>(proc) }
    }};
}

/// The resolved entry points, cached for the life of the process.
pub struct DllRuntime {
    sys_alloc_string: SysAllocStringFn,
    sys_free_string: SysFreeStringFn,
    safe_array_create_vector: SafeArrayCreateVectorFn,
    safe_array_put_element: SafeArrayPutElementFn,
    safe_array_destroy: SafeArrayDestroyFn,
    uia_return_raw_element_provider: UiaReturnRawElementProviderFn,
    uia_host_provider_from_hwnd: UiaHostProviderFromHwndFn,
    uia_raise_automation_event: UiaRaiseAutomationEventFn,
    uia_raise_property_changed: UiaRaisePropertyChangedFn,
    uia_raise_structure_changed: UiaRaiseStructureChangedFn,
    uia_raise_notification: UiaRaiseNotificationFn,
    uia_raise_changes: UiaRaiseChangesFn,
    uia_disconnect_provider: UiaDisconnectProviderFn,
    uia_disconnect_all: UiaDisconnectAllFn,
}

impl DllRuntime {
    /// Resolve every entry point the bridge calls.
    pub fn new() -> ComResult<Self> {
        let oleaut = load_library(w!("oleaut32.dll"))?;
        let uia = load_library(w!("uiautomationcore.dll"))?;

        Ok(Self {
            sys_alloc_string: bind!(oleaut, "SysAllocString", SysAllocStringFn),
            sys_free_string: bind!(oleaut, "SysFreeString", SysFreeStringFn),
            safe_array_create_vector: bind!(
                oleaut,
                "SafeArrayCreateVector",
                SafeArrayCreateVectorFn
            ),
            safe_array_put_element: bind!(oleaut, "SafeArrayPutElement", SafeArrayPutElementFn),
            safe_array_destroy: bind!(oleaut, "SafeArrayDestroy", SafeArrayDestroyFn),
            uia_return_raw_element_provider: bind!(
                uia,
                "UiaReturnRawElementProvider",
                UiaReturnRawElementProviderFn
            ),
            uia_host_provider_from_hwnd: bind!(
                uia,
                "UiaHostProviderFromHwnd",
                UiaHostProviderFromHwndFn
            ),
            uia_raise_automation_event: bind!(
                uia,
                "UiaRaiseAutomationEvent",
                UiaRaiseAutomationEventFn
            ),
            uia_raise_property_changed: bind!(
                uia,
                "UiaRaiseAutomationPropertyChangedEvent",
                UiaRaisePropertyChangedFn
            ),
            uia_raise_structure_changed: bind!(
                uia,
                "UiaRaiseStructureChangedEvent",
                UiaRaiseStructureChangedFn
            ),
            uia_raise_notification: bind!(
                uia,
                "UiaRaiseNotificationEvent",
                UiaRaiseNotificationFn
            ),
            uia_raise_changes: bind!(uia, "UiaRaiseChangesEvent", UiaRaiseChangesFn),
            uia_disconnect_provider: bind!(uia, "UiaDisconnectProvider", UiaDisconnectProviderFn),
            uia_disconnect_all: bind!(uia, "UiaDisconnectAllProviders", UiaDisconnectAllFn),
        })
    }
}

impl UiaRuntime for DllRuntime {
    fn alloc_string(&self, value: &str) -> *mut u16 {
        let wide = crate::bstr::to_wide(value);
        // SAFETY: wide is null-terminated; the platform copies it.
        unsafe { (self.sys_alloc_string)(wide.as_ptr()) }
    }

    unsafe fn free_string(&self, bstr: *mut u16) {
        // SAFETY: forwarded caller contract.
        unsafe { (self.sys_free_string)(bstr) }
    }

    fn create_vector(
        &self,
        element_type: VarType,
        lower_bound: i32,
        len: u32,
    ) -> *mut SafeArrayHeader {
        // SAFETY: the platform validates the element type itself.
        unsafe { (self.safe_array_create_vector)(element_type.0, lower_bound, len) }
    }

    unsafe fn put_element(
        &self,
        array: *mut SafeArrayHeader,
        index: i32,
        value: *const c_void,
    ) -> HResult {
        // SAFETY: forwarded caller contract; the index array has one entry
        // per dimension and ours are one-dimensional.
        unsafe { (self.safe_array_put_element)(array, &index, value) }
    }

    unsafe fn destroy_array(&self, array: *mut SafeArrayHeader) -> HResult {
        // SAFETY: forwarded caller contract.
        unsafe { (self.safe_array_destroy)(array) }
    }

    unsafe fn return_raw_element_provider(
        &self,
        hwnd: usize,
        wparam: usize,
        lparam: isize,
        provider: *mut c_void,
    ) -> isize {
        // SAFETY: forwarded caller contract.
        unsafe { (self.uia_return_raw_element_provider)(hwnd, wparam, lparam, provider) }
    }

    unsafe fn host_provider_from_hwnd(&self, hwnd: usize, out: *mut *mut c_void) -> HResult {
        // SAFETY: forwarded caller contract.
        unsafe { (self.uia_host_provider_from_hwnd)(hwnd, out) }
    }

    unsafe fn raise_automation_event(&self, provider: *mut c_void, event_id: u32) -> HResult {
        // SAFETY: forwarded caller contract.
        unsafe { (self.uia_raise_automation_event)(provider, event_id as i32) }
    }

    unsafe fn raise_property_changed(
        &self,
        provider: *mut c_void,
        property_id: u32,
        old_value: *const Variant,
        new_value: *const Variant,
    ) -> HResult {
        // SAFETY: forwarded caller contract; the records are passed by
        // reference per the x64 calling convention for by-value structs.
        unsafe {
            (self.uia_raise_property_changed)(provider, property_id as i32, old_value, new_value)
        }
    }

    unsafe fn raise_structure_changed(
        &self,
        provider: *mut c_void,
        change_type: u32,
        runtime_id: *const i32,
        runtime_id_len: i32,
    ) -> HResult {
        // SAFETY: forwarded caller contract.
        unsafe {
            (self.uia_raise_structure_changed)(
                provider,
                change_type as i32,
                runtime_id,
                runtime_id_len,
            )
        }
    }

    unsafe fn raise_notification(
        &self,
        provider: *mut c_void,
        kind: u32,
        processing: u32,
        display: *const u16,
        activity_id: *const u16,
    ) -> HResult {
        // SAFETY: forwarded caller contract.
        unsafe {
            (self.uia_raise_notification)(
                provider,
                kind as i32,
                processing as i32,
                display,
                activity_id,
            )
        }
    }

    unsafe fn raise_changes(
        &self,
        provider: *mut c_void,
        count: i32,
        changes: *const UiaChangeInfo,
    ) -> HResult {
        // SAFETY: forwarded caller contract.
        unsafe { (self.uia_raise_changes)(provider, count, changes) }
    }

    unsafe fn disconnect_provider(&self, provider: *mut c_void) -> HResult {
        // SAFETY: forwarded caller contract.
        unsafe { (self.uia_disconnect_provider)(provider) }
    }

    unsafe fn disconnect_all(&self) -> HResult {
        // SAFETY: outstanding references become unusable, per caller
        // contract.
        unsafe { (self.uia_disconnect_all)() }
    }
}
