//! The reference-counted provider object.
//!
//! A [`Provider`] is the native object handed to the external accessibility
//! client. It aggregates one interface head per capability it was composed
//! with; each head is a `{vtable pointer, back pointer}` pair, so a single
//! set of lifetime thunks serves every table and negotiation is a linear
//! identity match over the composed heads.
//!
//! Lifetime follows the platform contract: the count starts at one (the
//! application's own [`ProviderRef`]), every successful negotiation adds a
//! reference for the external caller, and the allocation is freed when the
//! count reaches zero. [`ProviderRef::disconnect`] marks the object unusable
//! even while external references are outstanding; after that every
//! capability entry returns a benign failure without touching application
//! state, while `AddRef`/`Release` keep working so outstanding references
//! still drain safely.
//!
//! Only the reference count and the disconnect flag are shared mutable
//! state, and both are atomics; no lock is taken anywhere on the boundary
//! path, because the external caller may be blocking a system-wide input
//! pump of its own.

use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering, fence};

use horizon_uia_core::{Guid, IID_IUNKNOWN, unknown};

use crate::error::{Result, UiaError};
use crate::ids::{NavigateDirection, PropertyId, ProviderOptions, ScrollAmount, ToggleState, UiaRect};
use crate::vtable::{
    IID_FRAGMENT_PROVIDER, IID_FRAGMENT_ROOT_PROVIDER, IID_INVOKE_PROVIDER, IID_SCROLL_PROVIDER,
    IID_SIMPLE_PROVIDER, IID_TOGGLE_PROVIDER, IID_VALUE_PROVIDER,
};

/// Index of the always-present simple head.
const SIMPLE: usize = 0;
/// One head per interface the bridge can expose.
const HEAD_COUNT: usize = 7;

/// An optional capability a provider can be composed with.
///
/// The simple-provider capability is not listed: every provider carries it.
/// Discriminants double as head indices inside the allocation.
#[repr(usize)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Capability {
    Fragment = 1,
    FragmentRoot = 2,
    Invoke = 3,
    Value = 4,
    Scroll = 5,
    Toggle = 6,
}

/// Bit set of composed heads.
#[derive(Clone, Copy)]
struct CapabilitySet(u8);

impl CapabilitySet {
    const SIMPLE_ONLY: Self = Self(1 << SIMPLE);

    fn insert(&mut self, capability: Capability) {
        self.0 |= 1 << capability as usize;
    }

    fn has(self, index: usize) -> bool {
        self.0 & (1 << index) != 0
    }
}

/// Scroll position and extent reported through the scroll capability.
///
/// Percentages run 0-100; view sizes are the visible share of the content,
/// also 0-100.
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct ScrollState {
    pub horizontal_percent: f64,
    pub vertical_percent: f64,
    pub horizontal_view_size: f64,
    pub vertical_view_size: f64,
    pub horizontally_scrollable: bool,
    pub vertically_scrollable: bool,
}

/// Application-side behavior of one exposed element.
///
/// The bridge owns lifetime, negotiation and marshaling; everything the
/// client can observe about the element itself comes from here. Methods are
/// called from whichever thread the external accessibility subsystem picks,
/// so implementations must be `Send + Sync` and must not block.
///
/// Every method has a benign default, so an implementation only overrides
/// what its capabilities actually need.
pub trait ProviderHandler: Send + Sync {
    /// Provider behavior flags reported to the client.
    fn provider_options(&self) -> ProviderOptions {
        ProviderOptions::SERVER_SIDE_PROVIDER | ProviderOptions::USE_COM_THREADING
    }

    /// Value of one property, or `None` for "not supported here" (the
    /// client falls back to its own defaults).
    fn property_value(&self, _property: PropertyId) -> Option<horizon_uia_core::Value> {
        None
    }

    /// Screen bounds of the element.
    fn bounding_rectangle(&self) -> UiaRect {
        UiaRect::default()
    }

    /// Neighbouring element in the given direction, if any.
    fn navigate(&self, _direction: NavigateDirection) -> Option<ProviderRef> {
        None
    }

    /// Move keyboard focus to the element.
    fn set_focus(&self) -> Result<()> {
        Ok(())
    }

    /// Root of the fragment tree this element belongs to. Defaults to the
    /// provider itself when it is composed as a fragment root.
    fn fragment_root(&self) -> Option<ProviderRef> {
        None
    }

    /// Element under the given screen point (fragment roots only).
    fn element_from_point(&self, _x: f64, _y: f64) -> Option<ProviderRef> {
        None
    }

    /// Element that currently has focus (fragment roots only).
    fn focused_element(&self) -> Option<ProviderRef> {
        None
    }

    /// Invoke capability: perform the element's default action.
    fn invoke(&self) -> Result<()> {
        Ok(())
    }

    /// Value capability: current textual value.
    fn value(&self) -> String {
        String::new()
    }

    /// Value capability: replace the value.
    fn set_value(&self, _value: &str) -> Result<()> {
        Ok(())
    }

    /// Value capability: whether the value rejects edits.
    fn is_read_only(&self) -> bool {
        true
    }

    /// Scroll capability: scroll by the requested amounts.
    fn scroll(&self, _horizontal: ScrollAmount, _vertical: ScrollAmount) -> Result<()> {
        Ok(())
    }

    /// Scroll capability: jump to the given percentages.
    fn set_scroll_percent(&self, _horizontal: f64, _vertical: f64) -> Result<()> {
        Ok(())
    }

    /// Scroll capability: current position and extents.
    fn scroll_state(&self) -> ScrollState {
        ScrollState::default()
    }

    /// Toggle capability: cycle the state.
    fn toggle(&self) -> Result<()> {
        Ok(())
    }

    /// Toggle capability: current state.
    fn toggle_state(&self) -> ToggleState {
        ToggleState::Off
    }
}

/// One interface head: a vtable pointer followed by the owning provider.
///
/// An interface pointer handed to the client is the address of one of these;
/// the client only ever dereferences the leading vtable pointer, and our
/// thunks recover the provider from the word behind it.
#[repr(C)]
struct InterfaceHead {
    vtbl: *const c_void,
    provider: *mut Provider,
}

/// The provider allocation. Created through [`ProviderBuilder`], freed when
/// the reference count drains to zero.
pub struct Provider {
    heads: [InterfaceHead; HEAD_COUNT],
    refs: AtomicUsize,
    disconnected: AtomicBool,
    caps: CapabilitySet,
    runtime_id: Vec<i32>,
    hwnd: usize,
    handler: Box<dyn ProviderHandler>,
}

impl Provider {
    fn add_ref(&self) -> u32 {
        (self.refs.fetch_add(1, Ordering::Relaxed) + 1) as u32
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }
}

/// Decrement the count, freeing the allocation when it reaches zero.
///
/// # Safety
///
/// `p` must be a live provider allocation and the caller must own one
/// reference, which this call consumes.
unsafe fn release_provider(p: *mut Provider) -> u32 {
    let prev = unsafe { (*p).refs.fetch_sub(1, Ordering::Release) };
    debug_assert!(prev != 0, "release past zero");
    if prev == 1 {
        // Pair with the Release decrements so the freeing thread sees every
        // write made while other references were alive.
        fence(Ordering::Acquire);
        tracing::trace!(target: "horizon_uia::provider", provider = p as usize, "provider freed");
        drop(unsafe { Box::from_raw(p) });
        0
    } else {
        (prev - 1) as u32
    }
}

/// Interface head address for one composed capability.
///
/// # Safety
///
/// `p` must be live and `index` within [`HEAD_COUNT`].
unsafe fn head_ptr(p: *mut Provider, index: usize) -> *mut c_void {
    unsafe { (&raw mut (*p).heads[index]) as *mut c_void }
}

/// Owning provider behind an interface pointer.
///
/// # Safety
///
/// `this` must be the address of an [`InterfaceHead`] inside a live
/// provider.
unsafe fn provider_ptr(this: *mut c_void) -> *mut Provider {
    unsafe { (*(this as *mut InterfaceHead)).provider }
}

/// Match a requested identity against the head layout.
fn head_index(iid: &Guid) -> Option<usize> {
    if *iid == IID_IUNKNOWN || *iid == IID_SIMPLE_PROVIDER {
        Some(SIMPLE)
    } else if *iid == IID_FRAGMENT_PROVIDER {
        Some(Capability::Fragment as usize)
    } else if *iid == IID_FRAGMENT_ROOT_PROVIDER {
        Some(Capability::FragmentRoot as usize)
    } else if *iid == IID_INVOKE_PROVIDER {
        Some(Capability::Invoke as usize)
    } else if *iid == IID_VALUE_PROVIDER {
        Some(Capability::Value as usize)
    } else if *iid == IID_SCROLL_PROVIDER {
        Some(Capability::Scroll as usize)
    } else if *iid == IID_TOGGLE_PROVIDER {
        Some(Capability::Toggle as usize)
    } else {
        None
    }
}

/// Composes a [`Provider`] from a handler and a capability subset.
pub struct ProviderBuilder {
    caps: CapabilitySet,
    runtime_id: Vec<i32>,
    hwnd: usize,
    handler: Box<dyn ProviderHandler>,
}

impl ProviderBuilder {
    /// Start from a handler; the simple capability is always composed.
    pub fn new(handler: impl ProviderHandler + 'static) -> Self {
        Self {
            caps: CapabilitySet::SIMPLE_ONLY,
            runtime_id: Vec::new(),
            hwnd: 0,
            handler: Box::new(handler),
        }
    }

    /// Compose one additional capability table.
    pub fn capability(mut self, capability: Capability) -> Self {
        self.caps.insert(capability);
        self
    }

    /// Compose several capability tables.
    pub fn capabilities(mut self, capabilities: impl IntoIterator<Item = Capability>) -> Self {
        for capability in capabilities {
            self.caps.insert(capability);
        }
        self
    }

    /// Stable runtime id of the element within its tree. Must not change
    /// across calls for the same element.
    pub fn runtime_id(mut self, id: Vec<i32>) -> Self {
        self.runtime_id = id;
        self
    }

    /// Hosting window handle, used for the native host provider hand-off.
    pub fn window(mut self, hwnd: usize) -> Self {
        self.hwnd = hwnd;
        self
    }

    /// Allocate the provider with a reference count of one, owned by the
    /// returned [`ProviderRef`].
    pub fn build(self) -> ProviderRef {
        let head = |vtbl: *const c_void| InterfaceHead {
            vtbl,
            provider: std::ptr::null_mut(),
        };
        let provider = Box::new(Provider {
            heads: [
                head(&thunks::SIMPLE_VTBL as *const _ as *const c_void),
                head(&thunks::FRAGMENT_VTBL as *const _ as *const c_void),
                head(&thunks::FRAGMENT_ROOT_VTBL as *const _ as *const c_void),
                head(&thunks::INVOKE_VTBL as *const _ as *const c_void),
                head(&thunks::VALUE_VTBL as *const _ as *const c_void),
                head(&thunks::SCROLL_VTBL as *const _ as *const c_void),
                head(&thunks::TOGGLE_VTBL as *const _ as *const c_void),
            ],
            refs: AtomicUsize::new(1),
            disconnected: AtomicBool::new(false),
            caps: self.caps,
            runtime_id: self.runtime_id,
            hwnd: self.hwnd,
            handler: self.handler,
        });
        let raw = Box::into_raw(provider);
        // SAFETY: raw is the unique pointer to the fresh allocation; the
        // back pointers are patched before anything else can observe it.
        unsafe {
            for head in &mut (*raw).heads {
                head.provider = raw;
            }
            tracing::trace!(target: "horizon_uia::provider", provider = raw as usize, "provider created");
            ProviderRef {
                ptr: NonNull::new_unchecked(raw),
            }
        }
    }
}

/// A counted reference to a provider, held by the application.
///
/// Cloning adds a reference, dropping releases one; the provider is freed
/// when application references and external references together reach zero.
pub struct ProviderRef {
    ptr: NonNull<Provider>,
}

// SAFETY: all shared mutable state behind the pointer is atomic, and the
// handler is required to be Send + Sync.
unsafe impl Send for ProviderRef {}
unsafe impl Sync for ProviderRef {}

static_assertions::assert_impl_all!(ProviderRef: Send, Sync);

impl ProviderRef {
    fn provider(&self) -> &Provider {
        // SAFETY: this reference keeps the count above zero, so the
        // allocation is live.
        unsafe { self.ptr.as_ref() }
    }

    /// Current reference count. Diagnostic; racy by nature.
    pub fn ref_count(&self) -> usize {
        self.provider().refs.load(Ordering::Relaxed)
    }

    /// Whether the provider was disconnected.
    pub fn is_disconnected(&self) -> bool {
        self.provider().is_disconnected()
    }

    /// The element's stable runtime id.
    pub fn runtime_id(&self) -> &[i32] {
        &self.provider().runtime_id
    }

    /// Negotiate an interface, as the external client would.
    ///
    /// On a match the returned handle owns one new reference. A miss is
    /// `NotSupported`; a disconnected provider answers `Disconnected`.
    pub fn query_interface(&self, iid: &Guid) -> Result<InterfaceHandle> {
        let provider = self.provider();
        if provider.is_disconnected() {
            return Err(UiaError::Disconnected);
        }
        let index = head_index(iid)
            .filter(|&index| provider.caps.has(index))
            .ok_or(UiaError::NotSupported)?;
        provider.add_ref();
        // SAFETY: the reference just added keeps the allocation live for
        // the handle; the head address is non-null by construction.
        unsafe {
            Ok(InterfaceHandle {
                ptr: NonNull::new_unchecked(head_ptr(self.ptr.as_ptr(), index)),
            })
        }
    }

    /// Mark the provider unusable and tell the platform to drop it.
    ///
    /// Safe to call while other threads are inside any boundary entry;
    /// outstanding references stay releasable, but every capability call
    /// from now on reports a benign failure. Idempotent.
    pub fn disconnect(&self) -> Result<()> {
        let provider = self.provider();
        if provider.disconnected.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        tracing::debug!(
            target: "horizon_uia::provider",
            provider = self.ptr.as_ptr() as usize,
            "provider disconnected"
        );
        let status = unsafe {
            // SAFETY: the simple head stays a valid interface pointer for
            // the platform to release against.
            horizon_uia_core::runtime().disconnect_provider(self.simple_ptr())
        };
        status.ok().map_err(|status| UiaError::PlatformCallFailure {
            call: "UiaDisconnectProvider",
            status,
        })
    }

    /// Borrowed simple-provider interface pointer (no reference added).
    pub(crate) fn simple_ptr(&self) -> *mut c_void {
        // SAFETY: self keeps the allocation live; SIMPLE is in bounds.
        unsafe { head_ptr(self.ptr.as_ptr(), SIMPLE) }
    }

    /// Hand this reference to the external caller as a raw interface
    /// pointer of the given head, or release it if the capability is not
    /// composed.
    fn transfer_head(self, index: usize) -> Option<*mut c_void> {
        if !self.provider().caps.has(index) {
            return None;
        }
        let ptr = self.ptr.as_ptr();
        std::mem::forget(self);
        // SAFETY: the forgotten reference now belongs to the raw pointer.
        Some(unsafe { head_ptr(ptr, index) })
    }
}

impl Clone for ProviderRef {
    fn clone(&self) -> Self {
        self.provider().add_ref();
        Self { ptr: self.ptr }
    }
}

impl Drop for ProviderRef {
    fn drop(&mut self) {
        // SAFETY: this reference owns one count.
        unsafe { release_provider(self.ptr.as_ptr()) };
    }
}

impl std::fmt::Debug for ProviderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRef")
            .field("provider", &self.ptr.as_ptr())
            .field("refs", &self.ref_count())
            .field("disconnected", &self.is_disconnected())
            .finish()
    }
}

/// An owned interface reference obtained through negotiation.
///
/// Dropping it releases the reference it owns.
#[derive(Debug)]
pub struct InterfaceHandle {
    ptr: NonNull<c_void>,
}

// SAFETY: the underlying provider is thread-safe and the handle only wraps
// a counted reference to it.
unsafe impl Send for InterfaceHandle {}
unsafe impl Sync for InterfaceHandle {}

impl InterfaceHandle {
    /// The raw interface pointer. Borrowed; the handle still owns the
    /// reference.
    pub fn as_ptr(&self) -> *mut c_void {
        self.ptr.as_ptr()
    }

    /// Release explicitly, returning the new reference count.
    pub fn release(self) -> u32 {
        let count = unsafe { unknown::release(self.ptr.as_ptr()) };
        std::mem::forget(self);
        count
    }
}

impl Drop for InterfaceHandle {
    fn drop(&mut self) {
        // SAFETY: the handle owns exactly one reference.
        unsafe { unknown::release(self.ptr.as_ptr()) };
    }
}

/// The static capability tables and their entry-point thunks.
///
/// Every entry recovers the provider from the interface head, answers a
/// benign failure if the provider is disconnected, and otherwise forwards
/// to the application handler, translating results to the boundary status
/// vocabulary. Out-parameters are always initialized, even on failure.
mod thunks {
    use std::ffi::c_void;
    use std::ptr;

    use horizon_uia_core::safearray::{SafeArrayHeader, i32_vector};
    use horizon_uia_core::{HResult, IUnknownVtbl, Value, Variant, bstr, runtime};

    use super::{Capability, head_index, head_ptr, provider_ptr, release_provider};
    use crate::ids::{NavigateDirection, PatternId, PropertyId, ScrollAmount, UiaRect};
    use crate::vtable::{
        FragmentProviderVtbl, FragmentRootProviderVtbl, InvokeProviderVtbl, ScrollProviderVtbl,
        SimpleProviderVtbl, ToggleProviderVtbl, ValueProviderVtbl,
    };

    pub(super) static SIMPLE_VTBL: SimpleProviderVtbl = SimpleProviderVtbl {
        base: IUnknownVtbl {
            query_interface,
            add_ref,
            release,
        },
        get_provider_options,
        get_pattern_provider,
        get_property_value,
        get_host_raw_element_provider,
    };

    pub(super) static FRAGMENT_VTBL: FragmentProviderVtbl = FragmentProviderVtbl {
        base: IUnknownVtbl {
            query_interface,
            add_ref,
            release,
        },
        navigate,
        get_runtime_id,
        get_bounding_rectangle,
        get_embedded_fragment_roots,
        set_focus,
        get_fragment_root,
    };

    pub(super) static FRAGMENT_ROOT_VTBL: FragmentRootProviderVtbl = FragmentRootProviderVtbl {
        base: IUnknownVtbl {
            query_interface,
            add_ref,
            release,
        },
        element_provider_from_point,
        get_focus,
    };

    pub(super) static INVOKE_VTBL: InvokeProviderVtbl = InvokeProviderVtbl {
        base: IUnknownVtbl {
            query_interface,
            add_ref,
            release,
        },
        invoke,
    };

    pub(super) static VALUE_VTBL: ValueProviderVtbl = ValueProviderVtbl {
        base: IUnknownVtbl {
            query_interface,
            add_ref,
            release,
        },
        set_value,
        get_value,
        get_is_read_only,
    };

    pub(super) static SCROLL_VTBL: ScrollProviderVtbl = ScrollProviderVtbl {
        base: IUnknownVtbl {
            query_interface,
            add_ref,
            release,
        },
        scroll,
        set_scroll_percent,
        get_horizontal_scroll_percent,
        get_vertical_scroll_percent,
        get_horizontal_view_size,
        get_vertical_view_size,
        get_horizontally_scrollable,
        get_vertically_scrollable,
    };

    pub(super) static TOGGLE_VTBL: ToggleProviderVtbl = ToggleProviderVtbl {
        base: IUnknownVtbl {
            query_interface,
            add_ref,
            release,
        },
        toggle,
        get_toggle_state,
    };

    /// Recover the provider behind `this` if it is live and connected.
    ///
    /// The benign `Disconnected` answer at the boundary is the generic
    /// failure status; the caller may keep probing or release.
    unsafe fn live<'a>(this: *mut c_void) -> Result<&'a super::Provider, HResult> {
        if this.is_null() {
            return Err(HResult::NULL_POINTER);
        }
        let p = unsafe { provider_ptr(this) };
        if p.is_null() {
            return Err(HResult::UNEXPECTED);
        }
        let provider = unsafe { &*p };
        if provider.is_disconnected() {
            return Err(HResult::FAIL);
        }
        Ok(provider)
    }

    /// Write a null into an out-pointer if there is one.
    unsafe fn clear_out(out: *mut *mut c_void) {
        if !out.is_null() {
            unsafe { *out = ptr::null_mut() };
        }
    }

    // ------------------------------------------------------------------
    // IUnknown slots (shared by every table)
    // ------------------------------------------------------------------

    unsafe extern "system" fn query_interface(
        this: *mut c_void,
        iid: *const horizon_uia_core::Guid,
        out: *mut *mut c_void,
    ) -> HResult {
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = ptr::null_mut() };
        if this.is_null() || iid.is_null() {
            return HResult::NULL_POINTER;
        }
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        let Some(index) = head_index(unsafe { &*iid }) else {
            return HResult::NO_INTERFACE;
        };
        if !provider.caps.has(index) {
            return HResult::NO_INTERFACE;
        }
        // A successful negotiation carries AddRef semantics.
        provider.add_ref();
        unsafe {
            *out = head_ptr(provider_ptr(this), index);
        }
        HResult::OK
    }

    unsafe extern "system" fn add_ref(this: *mut c_void) -> u32 {
        if this.is_null() {
            return 0;
        }
        // Still counted while disconnected, so outstanding references keep
        // draining correctly.
        unsafe { (*provider_ptr(this)).add_ref() }
    }

    unsafe extern "system" fn release(this: *mut c_void) -> u32 {
        if this.is_null() {
            return 0;
        }
        unsafe { release_provider(provider_ptr(this)) }
    }

    // ------------------------------------------------------------------
    // IRawElementProviderSimple
    // ------------------------------------------------------------------

    unsafe extern "system" fn get_provider_options(this: *mut c_void, out: *mut u32) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = provider.handler.provider_options().0 };
        HResult::OK
    }

    unsafe extern "system" fn get_pattern_provider(
        this: *mut c_void,
        pattern_id: i32,
        out: *mut *mut c_void,
    ) -> HResult {
        unsafe { clear_out(out) };
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        let capability = match PatternId(pattern_id as u32) {
            PatternId::INVOKE => Some(Capability::Invoke),
            PatternId::VALUE => Some(Capability::Value),
            PatternId::SCROLL => Some(Capability::Scroll),
            PatternId::TOGGLE => Some(Capability::Toggle),
            _ => None,
        };
        // A pattern the provider does not implement is a null result with
        // success, per the platform contract.
        if let Some(capability) = capability {
            let index = capability as usize;
            if provider.caps.has(index) {
                provider.add_ref();
                unsafe { *out = head_ptr(provider_ptr(this), index) };
            }
        }
        HResult::OK
    }

    unsafe extern "system" fn get_property_value(
        this: *mut c_void,
        property_id: i32,
        out: *mut Variant,
    ) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        // Absent values answer as an empty record with success.
        unsafe { out.write(Variant::empty()) };
        let Some(value) = provider.handler.property_value(PropertyId(property_id as u32)) else {
            return HResult::OK;
        };
        let mut record = Variant::empty();
        match value {
            Value::Empty => {}
            Value::Bool(b) => record.set_bool(b),
            Value::I32(n) => record.set_i32(n),
            Value::String(s) => {
                if record.set_string(runtime(), &s).is_err() {
                    return HResult::OUT_OF_MEMORY;
                }
            }
            Value::Object(address) => {
                // SAFETY: the handler vouches that the address is a live
                // interface pointer.
                unsafe { record.set_object(address as *mut c_void) };
            }
        }
        unsafe { out.write(record) };
        HResult::OK
    }

    unsafe extern "system" fn get_host_raw_element_provider(
        this: *mut c_void,
        out: *mut *mut c_void,
    ) -> HResult {
        unsafe { clear_out(out) };
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        if provider.hwnd == 0 {
            return HResult::OK;
        }
        // SAFETY: out is writable; the platform hands back an owned
        // reference for the client.
        unsafe { runtime().host_provider_from_hwnd(provider.hwnd, out) }
    }

    // ------------------------------------------------------------------
    // IRawElementProviderFragment
    // ------------------------------------------------------------------

    unsafe extern "system" fn navigate(
        this: *mut c_void,
        direction: u32,
        out: *mut *mut c_void,
    ) -> HResult {
        unsafe { clear_out(out) };
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        let Some(direction) = NavigateDirection::from_raw(direction) else {
            return HResult::INVALID_ARG;
        };
        if let Some(target) = provider.handler.navigate(direction) {
            match target.transfer_head(Capability::Fragment as usize) {
                Some(fragment) => unsafe { *out = fragment },
                None => {
                    tracing::warn!(
                        target: "horizon_uia::provider",
                        "navigation target has no fragment capability, dropping it"
                    );
                }
            }
        }
        HResult::OK
    }

    unsafe extern "system" fn get_runtime_id(
        this: *mut c_void,
        out: *mut *mut SafeArrayHeader,
    ) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = ptr::null_mut() };
        match i32_vector(runtime(), &provider.runtime_id) {
            Ok(array) => {
                // Ownership of the array transfers to the client.
                unsafe { *out = array.into_raw() };
                HResult::OK
            }
            Err(err) => err.to_hresult(),
        }
    }

    unsafe extern "system" fn get_bounding_rectangle(
        this: *mut c_void,
        out: *mut UiaRect,
    ) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { out.write(provider.handler.bounding_rectangle()) };
        HResult::OK
    }

    unsafe extern "system" fn get_embedded_fragment_roots(
        this: *mut c_void,
        out: *mut *mut SafeArrayHeader,
    ) -> HResult {
        if let Err(status) = unsafe { live(this) } {
            return status;
        }
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        // No embedded roots: a null array with success.
        unsafe { *out = ptr::null_mut() };
        HResult::OK
    }

    unsafe extern "system" fn set_focus(this: *mut c_void) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        match provider.handler.set_focus() {
            Ok(()) => HResult::OK,
            Err(err) => err.to_hresult(),
        }
    }

    unsafe extern "system" fn get_fragment_root(
        this: *mut c_void,
        out: *mut *mut c_void,
    ) -> HResult {
        unsafe { clear_out(out) };
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        let root_index = Capability::FragmentRoot as usize;
        match provider.handler.fragment_root() {
            Some(root) => {
                if let Some(fragment_root) = root.transfer_head(root_index) {
                    unsafe { *out = fragment_root };
                }
            }
            // A provider that is itself a fragment root answers with
            // itself.
            None if provider.caps.has(root_index) => {
                provider.add_ref();
                unsafe { *out = head_ptr(provider_ptr(this), root_index) };
            }
            None => {}
        }
        HResult::OK
    }

    // ------------------------------------------------------------------
    // IRawElementProviderFragmentRoot
    // ------------------------------------------------------------------

    unsafe extern "system" fn element_provider_from_point(
        this: *mut c_void,
        x: f64,
        y: f64,
        out: *mut *mut c_void,
    ) -> HResult {
        unsafe { clear_out(out) };
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        if let Some(hit) = provider.handler.element_from_point(x, y)
            && let Some(fragment) = hit.transfer_head(Capability::Fragment as usize)
        {
            unsafe { *out = fragment };
        }
        HResult::OK
    }

    unsafe extern "system" fn get_focus(this: *mut c_void, out: *mut *mut c_void) -> HResult {
        unsafe { clear_out(out) };
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        if let Some(focused) = provider.handler.focused_element()
            && let Some(fragment) = focused.transfer_head(Capability::Fragment as usize)
        {
            unsafe { *out = fragment };
        }
        HResult::OK
    }

    // ------------------------------------------------------------------
    // IInvokeProvider
    // ------------------------------------------------------------------

    unsafe extern "system" fn invoke(this: *mut c_void) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        match provider.handler.invoke() {
            Ok(()) => HResult::OK,
            Err(err) => err.to_hresult(),
        }
    }

    // ------------------------------------------------------------------
    // IValueProvider
    // ------------------------------------------------------------------

    unsafe extern "system" fn set_value(this: *mut c_void, value: *const u16) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if value.is_null() {
            return HResult::NULL_POINTER;
        }
        // SAFETY: the client passes a null-terminated wide string.
        let value = unsafe { bstr::wide_to_string(value) };
        match provider.handler.set_value(&value) {
            Ok(()) => HResult::OK,
            Err(err) => err.to_hresult(),
        }
    }

    unsafe extern "system" fn get_value(this: *mut c_void, out: *mut *mut u16) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = ptr::null_mut() };
        let value = provider.handler.value();
        let bstr = runtime().alloc_string(&value);
        if bstr.is_null() {
            return HResult::OUT_OF_MEMORY;
        }
        // Ownership of the string transfers to the client.
        unsafe { *out = bstr };
        HResult::OK
    }

    unsafe extern "system" fn get_is_read_only(this: *mut c_void, out: *mut i32) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = i32::from(provider.handler.is_read_only()) };
        HResult::OK
    }

    // ------------------------------------------------------------------
    // IScrollProvider
    // ------------------------------------------------------------------

    unsafe extern "system" fn scroll(this: *mut c_void, horizontal: u32, vertical: u32) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        let (Some(horizontal), Some(vertical)) = (
            ScrollAmount::from_raw(horizontal),
            ScrollAmount::from_raw(vertical),
        ) else {
            return HResult::INVALID_ARG;
        };
        match provider.handler.scroll(horizontal, vertical) {
            Ok(()) => HResult::OK,
            Err(err) => err.to_hresult(),
        }
    }

    unsafe extern "system" fn set_scroll_percent(
        this: *mut c_void,
        horizontal: f64,
        vertical: f64,
    ) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        match provider.handler.set_scroll_percent(horizontal, vertical) {
            Ok(()) => HResult::OK,
            Err(err) => err.to_hresult(),
        }
    }

    unsafe extern "system" fn get_horizontal_scroll_percent(
        this: *mut c_void,
        out: *mut f64,
    ) -> HResult {
        unsafe { scroll_field(this, out, |s| s.horizontal_percent) }
    }

    unsafe extern "system" fn get_vertical_scroll_percent(
        this: *mut c_void,
        out: *mut f64,
    ) -> HResult {
        unsafe { scroll_field(this, out, |s| s.vertical_percent) }
    }

    unsafe extern "system" fn get_horizontal_view_size(
        this: *mut c_void,
        out: *mut f64,
    ) -> HResult {
        unsafe { scroll_field(this, out, |s| s.horizontal_view_size) }
    }

    unsafe extern "system" fn get_vertical_view_size(this: *mut c_void, out: *mut f64) -> HResult {
        unsafe { scroll_field(this, out, |s| s.vertical_view_size) }
    }

    unsafe extern "system" fn get_horizontally_scrollable(
        this: *mut c_void,
        out: *mut i32,
    ) -> HResult {
        unsafe { scroll_flag(this, out, |s| s.horizontally_scrollable) }
    }

    unsafe extern "system" fn get_vertically_scrollable(
        this: *mut c_void,
        out: *mut i32,
    ) -> HResult {
        unsafe { scroll_flag(this, out, |s| s.vertically_scrollable) }
    }

    unsafe fn scroll_field(
        this: *mut c_void,
        out: *mut f64,
        read: impl Fn(super::ScrollState) -> f64,
    ) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = read(provider.handler.scroll_state()) };
        HResult::OK
    }

    unsafe fn scroll_flag(
        this: *mut c_void,
        out: *mut i32,
        read: impl Fn(super::ScrollState) -> bool,
    ) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = i32::from(read(provider.handler.scroll_state())) };
        HResult::OK
    }

    // ------------------------------------------------------------------
    // IToggleProvider
    // ------------------------------------------------------------------

    unsafe extern "system" fn toggle(this: *mut c_void) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        match provider.handler.toggle() {
            Ok(()) => HResult::OK,
            Err(err) => err.to_hresult(),
        }
    }

    unsafe extern "system" fn get_toggle_state(this: *mut c_void, out: *mut u32) -> HResult {
        let provider = match unsafe { live(this) } {
            Ok(provider) => provider,
            Err(status) => return status,
        };
        if out.is_null() {
            return HResult::NULL_POINTER;
        }
        unsafe { *out = provider.handler.toggle_state() as u32 };
        HResult::OK
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicUsize;

    use horizon_uia_core::{HResult, Value, Variant, unknown};

    use crate::ids::PatternId;
    use crate::vtable::SimpleProviderVtbl;

    struct Checkbox {
        toggles: AtomicUsize,
        dropped: Arc<AtomicBool>,
    }

    impl ProviderHandler for Checkbox {
        fn property_value(&self, property: PropertyId) -> Option<Value> {
            match property {
                PropertyId::NAME => Some(Value::String("Mute".into())),
                PropertyId::IS_ENABLED => Some(Value::Bool(true)),
                PropertyId::CONTROL_TYPE => {
                    Some(Value::I32(crate::ids::ControlTypeId::CHECK_BOX.0 as i32))
                }
                _ => None,
            }
        }

        fn toggle(&self) -> Result<()> {
            self.toggles.fetch_add(1, Ordering::Relaxed);
            Ok(())
        }

        fn toggle_state(&self) -> ToggleState {
            if self.toggles.load(Ordering::Relaxed) % 2 == 1 {
                ToggleState::On
            } else {
                ToggleState::Off
            }
        }
    }

    impl Drop for Checkbox {
        fn drop(&mut self) {
            self.dropped.store(true, Ordering::Release);
        }
    }

    fn checkbox_provider() -> (ProviderRef, Arc<AtomicBool>) {
        let dropped = Arc::new(AtomicBool::new(false));
        let handler = Checkbox {
            toggles: AtomicUsize::new(0),
            dropped: dropped.clone(),
        };
        let provider = ProviderBuilder::new(handler)
            .capability(Capability::Fragment)
            .capability(Capability::Toggle)
            .runtime_id(vec![42, 7])
            .build();
        (provider, dropped)
    }

    #[test]
    fn starts_with_one_reference() {
        let (provider, dropped) = checkbox_provider();
        assert_eq!(provider.ref_count(), 1);
        assert_eq!(provider.runtime_id(), &[42, 7]);
        drop(provider);
        assert!(dropped.load(Ordering::Acquire));
    }

    #[test]
    fn negotiation_hits_and_misses() {
        let (provider, _) = checkbox_provider();

        let unknown = provider.query_interface(&IID_IUNKNOWN).unwrap();
        let fragment = provider.query_interface(&IID_FRAGMENT_PROVIDER).unwrap();
        let toggle = provider.query_interface(&IID_TOGGLE_PROVIDER).unwrap();
        assert_eq!(provider.ref_count(), 4);

        // Distinct tables behind distinct head addresses.
        assert_ne!(unknown.as_ptr(), fragment.as_ptr());
        assert_ne!(fragment.as_ptr(), toggle.as_ptr());

        // A capability that was not composed is an expected miss.
        assert_eq!(
            provider.query_interface(&IID_VALUE_PROVIDER).unwrap_err(),
            UiaError::NotSupported
        );

        drop((unknown, fragment, toggle));
        assert_eq!(provider.ref_count(), 1);
    }

    #[test]
    fn property_values_marshal_through_the_simple_table() {
        let (provider, _) = checkbox_provider();
        let handle = provider.query_interface(&IID_SIMPLE_PROVIDER).unwrap();

        // Dispatch by raw address, exactly as the external client does.
        let this = handle.as_ptr();
        let vtbl = unsafe { *(this as *mut *const SimpleProviderVtbl) };

        let mut name = Variant::empty();
        let status = unsafe {
            ((*vtbl).get_property_value)(this, PropertyId::NAME.0 as i32, name.as_mut_ptr())
        };
        assert!(status.is_ok());
        assert_eq!(name.value(), Value::String("Mute".into()));
        name.release(horizon_uia_core::runtime());

        let mut absent = Variant::empty();
        let status = unsafe {
            ((*vtbl).get_property_value)(
                this,
                PropertyId::HELP_TEXT.0 as i32,
                absent.as_mut_ptr(),
            )
        };
        assert!(status.is_ok());
        assert_eq!(absent.value(), Value::Empty);
    }

    #[test]
    fn pattern_provider_maps_to_composed_capability() {
        let (provider, _) = checkbox_provider();
        let handle = provider.query_interface(&IID_SIMPLE_PROVIDER).unwrap();
        let this = handle.as_ptr();
        let vtbl = unsafe { *(this as *mut *const SimpleProviderVtbl) };

        let mut pattern = std::ptr::null_mut();
        let status =
            unsafe { ((*vtbl).get_pattern_provider)(this, PatternId::TOGGLE.0 as i32, &mut pattern) };
        assert!(status.is_ok());
        assert!(!pattern.is_null());
        assert_eq!(unsafe { unknown::release(pattern) }, 2);

        // Value pattern was not composed: success with a null result.
        let mut missing = std::ptr::null_mut();
        let status =
            unsafe { ((*vtbl).get_pattern_provider)(this, PatternId::VALUE.0 as i32, &mut missing) };
        assert!(status.is_ok());
        assert!(missing.is_null());
    }

    #[test]
    fn disconnect_turns_capability_calls_benign() {
        let (provider, dropped) = checkbox_provider();
        let handle = provider.query_interface(&IID_SIMPLE_PROVIDER).unwrap();
        let this = handle.as_ptr();
        let vtbl = unsafe { *(this as *mut *const SimpleProviderVtbl) };

        provider.disconnect().unwrap();
        assert!(provider.is_disconnected());
        // Idempotent.
        provider.disconnect().unwrap();

        // Capability entries answer the benign failure without touching the
        // handler.
        let mut options = 0u32;
        let status = unsafe { ((*vtbl).get_provider_options)(this, &mut options) };
        assert_eq!(status, HResult::FAIL);

        // Negotiation is refused too.
        assert_eq!(
            provider.query_interface(&IID_TOGGLE_PROVIDER).unwrap_err(),
            UiaError::Disconnected
        );

        // But the outstanding reference still releases safely.
        drop(handle);
        assert_eq!(provider.ref_count(), 1);
        drop(provider);
        assert!(dropped.load(Ordering::Acquire));
    }

    #[test]
    fn toggle_round_trip_through_raw_table() {
        let (provider, _) = checkbox_provider();
        let handle = provider.query_interface(&IID_TOGGLE_PROVIDER).unwrap();
        let this = handle.as_ptr();
        let vtbl = unsafe { *(this as *mut *const crate::vtable::ToggleProviderVtbl) };

        let mut state = u32::MAX;
        unsafe {
            assert!(((*vtbl).get_toggle_state)(this, &mut state).is_ok());
            assert_eq!(state, ToggleState::Off as u32);
            assert!(((*vtbl).toggle)(this).is_ok());
            assert!(((*vtbl).get_toggle_state)(this, &mut state).is_ok());
            assert_eq!(state, ToggleState::On as u32);
        }
    }
}
