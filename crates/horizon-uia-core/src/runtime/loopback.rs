//! In-process loopback runtime.
//!
//! Emulates the platform string and array services with bit-exact layouts
//! and records every accessibility call in a journal instead of forwarding
//! it. This is the default registry off-Windows and the test double
//! everywhere: marshaling code runs unchanged against it, and tests assert
//! on what would have reached the platform.

use std::alloc::{self, Layout};
use std::ffi::c_void;
use std::ptr;

use parking_lot::Mutex;

use crate::bstr;
use crate::hresult::HResult;
use crate::safearray::{SafeArrayBound, SafeArrayHeader, features};
use crate::variant::{UiaChangeInfo, Value, VarType, Variant};

use super::UiaRuntime;

/// One recorded accessibility call.
#[derive(Debug, Clone, PartialEq)]
pub enum JournalEntry {
    ProviderReturned {
        hwnd: usize,
        provider: usize,
    },
    HostProviderQueried {
        hwnd: usize,
    },
    AutomationEvent {
        provider: usize,
        event_id: u32,
    },
    PropertyChanged {
        provider: usize,
        property_id: u32,
        old: Value,
        new: Value,
    },
    StructureChanged {
        provider: usize,
        change_type: u32,
        runtime_id: Vec<i32>,
    },
    Notification {
        provider: usize,
        kind: u32,
        processing: u32,
        display: String,
        activity_id: String,
    },
    Changes {
        provider: usize,
        uia_ids: Vec<i32>,
    },
    ProviderDisconnected {
        provider: usize,
    },
    AllProvidersDisconnected,
}

/// The recorded calls of a [`LoopbackRuntime`], in call order.
#[derive(Default)]
pub struct EventJournal {
    entries: Mutex<Vec<JournalEntry>>,
}

impl EventJournal {
    fn record(&self, entry: JournalEntry) {
        self.entries.lock().push(entry);
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<JournalEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    /// Number of recorded calls.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// The loopback registry implementation.
#[derive(Default)]
pub struct LoopbackRuntime {
    journal: EventJournal,
}

impl LoopbackRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Size of one element for the array kinds the bridge marshals.
fn element_size(vt: VarType) -> Option<usize> {
    match vt {
        VarType::I1 | VarType::UI1 => Some(1),
        VarType::I2 | VarType::UI2 | VarType::BOOL => Some(2),
        VarType::I4 | VarType::UI4 | VarType::R4 | VarType::INT | VarType::UINT
        | VarType::ERROR | VarType::HRESULT => Some(4),
        VarType::I8 | VarType::UI8 | VarType::R8 | VarType::CY | VarType::DATE => Some(8),
        VarType::BSTR | VarType::UNKNOWN | VarType::DISPATCH => {
            Some(std::mem::size_of::<usize>())
        }
        VarType::VARIANT => Some(std::mem::size_of::<Variant>()),
        _ => None,
    }
}

fn data_layout(element_size: usize, len: usize) -> Option<Layout> {
    Layout::from_size_align(element_size.checked_mul(len)?, 8).ok()
}

impl UiaRuntime for LoopbackRuntime {
    fn alloc_string(&self, value: &str) -> *mut u16 {
        let utf16: Vec<u16> = value.encode_utf16().collect();
        let byte_len = utf16.len() * 2;
        let Ok(layout) = Layout::from_size_align(4 + byte_len + 2, 4) else {
            return ptr::null_mut();
        };
        // SAFETY: the layout is non-zero sized (at least prefix + null) and
        // the writes below stay within it.
        unsafe {
            let raw = alloc::alloc(layout);
            if raw.is_null() {
                return ptr::null_mut();
            }
            (raw as *mut u32).write(byte_len as u32);
            let data = raw.add(4) as *mut u16;
            ptr::copy_nonoverlapping(utf16.as_ptr(), data, utf16.len());
            data.add(utf16.len()).write(0);
            data
        }
    }

    unsafe fn free_string(&self, bstr: *mut u16) {
        if bstr.is_null() {
            return;
        }
        // SAFETY: the allocation came from alloc_string; its layout is
        // reconstructed from the stored length prefix.
        unsafe {
            let byte_len = bstr::len(bstr) * 2;
            let layout = Layout::from_size_align(4 + byte_len + 2, 4)
                .expect("BSTR layout was valid at allocation");
            alloc::dealloc((bstr as *mut u8).sub(4), layout);
        }
    }

    fn create_vector(
        &self,
        element_type: VarType,
        lower_bound: i32,
        len: u32,
    ) -> *mut SafeArrayHeader {
        let Some(size) = element_size(element_type) else {
            return ptr::null_mut();
        };
        let Some(layout) = data_layout(size, len as usize) else {
            return ptr::null_mut();
        };
        let data = if layout.size() == 0 {
            ptr::null_mut()
        } else {
            // SAFETY: non-zero layout; zeroed so untouched elements decode
            // as empty.
            let raw = unsafe { alloc::alloc_zeroed(layout) };
            if raw.is_null() {
                return ptr::null_mut();
            }
            raw as *mut c_void
        };
        Box::into_raw(Box::new(SafeArrayHeader {
            dims: 1,
            features: features::FADF_HAVEVARTYPE,
            element_size: size as u32,
            locks: 0,
            data,
            bounds: [SafeArrayBound {
                elements: len,
                lower_bound,
            }],
        }))
    }

    unsafe fn put_element(
        &self,
        array: *mut SafeArrayHeader,
        index: i32,
        value: *const c_void,
    ) -> HResult {
        if array.is_null() || value.is_null() {
            return HResult::NULL_POINTER;
        }
        // SAFETY: caller guarantees the header is live.
        let header = unsafe { &*array };
        let bound = header.bounds[0];
        let offset = index.wrapping_sub(bound.lower_bound);
        if offset < 0 || offset as u32 >= bound.elements {
            return HResult::INVALID_ARG;
        }
        if header.locks != 0 {
            return HResult::FAIL;
        }
        // SAFETY: offset is inside the declared bounds and data spans
        // elements * element_size bytes.
        unsafe {
            let dst = (header.data as *mut u8)
                .add(offset as usize * header.element_size as usize);
            ptr::copy_nonoverlapping(value as *const u8, dst, header.element_size as usize);
        }
        HResult::OK
    }

    unsafe fn destroy_array(&self, array: *mut SafeArrayHeader) -> HResult {
        if array.is_null() {
            return HResult::NULL_POINTER;
        }
        // SAFETY: caller guarantees the header is live and came from
        // create_vector.
        let header = unsafe { Box::from_raw(array) };
        if header.locks != 0 {
            // Leak rather than free under an outstanding lock.
            let _ = Box::into_raw(header);
            return HResult::FAIL;
        }
        if !header.data.is_null() {
            let layout = data_layout(
                header.element_size as usize,
                header.bounds[0].elements as usize,
            )
            .expect("array layout was valid at allocation");
            // SAFETY: data was allocated with exactly this layout.
            unsafe { alloc::dealloc(header.data as *mut u8, layout) };
        }
        HResult::OK
    }

    unsafe fn return_raw_element_provider(
        &self,
        hwnd: usize,
        _wparam: usize,
        _lparam: isize,
        provider: *mut c_void,
    ) -> isize {
        self.journal.record(JournalEntry::ProviderReturned {
            hwnd,
            provider: provider as usize,
        });
        1
    }

    unsafe fn host_provider_from_hwnd(&self, hwnd: usize, out: *mut *mut c_void) -> HResult {
        self.journal
            .record(JournalEntry::HostProviderQueried { hwnd });
        if !out.is_null() {
            // SAFETY: caller guarantees out is writable.
            unsafe { *out = ptr::null_mut() };
        }
        // There is no native host here; callers treat this as a soft miss.
        HResult::NOT_IMPL
    }

    unsafe fn raise_automation_event(&self, provider: *mut c_void, event_id: u32) -> HResult {
        self.journal.record(JournalEntry::AutomationEvent {
            provider: provider as usize,
            event_id,
        });
        HResult::OK
    }

    unsafe fn raise_property_changed(
        &self,
        provider: *mut c_void,
        property_id: u32,
        old_value: *const Variant,
        new_value: *const Variant,
    ) -> HResult {
        if old_value.is_null() || new_value.is_null() {
            return HResult::NULL_POINTER;
        }
        // SAFETY: caller guarantees both records are live for this call.
        let (old, new) = unsafe { ((*old_value).value(), (*new_value).value()) };
        self.journal.record(JournalEntry::PropertyChanged {
            provider: provider as usize,
            property_id,
            old,
            new,
        });
        HResult::OK
    }

    unsafe fn raise_structure_changed(
        &self,
        provider: *mut c_void,
        change_type: u32,
        runtime_id: *const i32,
        runtime_id_len: i32,
    ) -> HResult {
        if runtime_id_len < 0 || (runtime_id.is_null() && runtime_id_len != 0) {
            return HResult::INVALID_ARG;
        }
        let runtime_id = if runtime_id.is_null() {
            Vec::new()
        } else {
            // SAFETY: caller guarantees runtime_id_len readable integers.
            unsafe { std::slice::from_raw_parts(runtime_id, runtime_id_len as usize).to_vec() }
        };
        self.journal.record(JournalEntry::StructureChanged {
            provider: provider as usize,
            change_type,
            runtime_id,
        });
        HResult::OK
    }

    unsafe fn raise_notification(
        &self,
        provider: *mut c_void,
        kind: u32,
        processing: u32,
        display: *const u16,
        activity_id: *const u16,
    ) -> HResult {
        // SAFETY: caller guarantees both strings are live platform strings.
        let display = if display.is_null() {
            String::new()
        } else {
            unsafe { bstr::to_string(display) }
        };
        let activity_id = if activity_id.is_null() {
            String::new()
        } else {
            unsafe { bstr::to_string(activity_id) }
        };
        self.journal.record(JournalEntry::Notification {
            provider: provider as usize,
            kind,
            processing,
            display,
            activity_id,
        });
        HResult::OK
    }

    unsafe fn raise_changes(
        &self,
        provider: *mut c_void,
        count: i32,
        changes: *const UiaChangeInfo,
    ) -> HResult {
        if count < 0 || (changes.is_null() && count != 0) {
            return HResult::INVALID_ARG;
        }
        let uia_ids = if count == 0 {
            Vec::new()
        } else {
            // SAFETY: caller guarantees count readable records.
            unsafe {
                std::slice::from_raw_parts(changes, count as usize)
                    .iter()
                    .map(|c| c.uia_id)
                    .collect()
            }
        };
        self.journal.record(JournalEntry::Changes {
            provider: provider as usize,
            uia_ids,
        });
        HResult::OK
    }

    unsafe fn disconnect_provider(&self, provider: *mut c_void) -> HResult {
        self.journal.record(JournalEntry::ProviderDisconnected {
            provider: provider as usize,
        });
        HResult::OK
    }

    unsafe fn disconnect_all(&self) -> HResult {
        self.journal.record(JournalEntry::AllProvidersDisconnected);
        HResult::OK
    }

    fn journal(&self) -> Option<&EventJournal> {
        Some(&self.journal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_allocation_has_bstr_layout() {
        let rt = LoopbackRuntime::new();
        let bstr = rt.alloc_string("menu item");
        assert!(!bstr.is_null());
        unsafe {
            assert_eq!(bstr::len(bstr), "menu item".len());
            assert_eq!(bstr::to_string(bstr), "menu item");
            rt.free_string(bstr);
        }
    }

    #[test]
    fn empty_string_allocates() {
        let rt = LoopbackRuntime::new();
        let bstr = rt.alloc_string("");
        assert!(!bstr.is_null());
        unsafe {
            assert_eq!(bstr::len(bstr), 0);
            rt.free_string(bstr);
        }
    }

    #[test]
    fn vector_respects_lower_bound() {
        let rt = LoopbackRuntime::new();
        let array = rt.create_vector(VarType::I4, 10, 2);
        assert!(!array.is_null());
        unsafe {
            let v = 7i32;
            let p = &v as *const i32 as *const c_void;
            assert_eq!(rt.put_element(array, 10, p), HResult::OK);
            assert_eq!(rt.put_element(array, 11, p), HResult::OK);
            assert_eq!(rt.put_element(array, 9, p), HResult::INVALID_ARG);
            assert_eq!(rt.put_element(array, 12, p), HResult::INVALID_ARG);
            assert_eq!(rt.destroy_array(array), HResult::OK);
        }
    }

    #[test]
    fn unsupported_element_kind_fails_creation() {
        let rt = LoopbackRuntime::new();
        assert!(rt.create_vector(VarType::RECORD, 0, 4).is_null());
    }

    #[test]
    fn journal_records_in_order() {
        let rt = LoopbackRuntime::new();
        unsafe {
            rt.raise_automation_event(ptr::null_mut(), 20000);
            rt.disconnect_all();
        }
        let entries = rt.journal().unwrap().take();
        assert_eq!(
            entries,
            vec![
                JournalEntry::AutomationEvent {
                    provider: 0,
                    event_id: 20000
                },
                JournalEntry::AllProvidersDisconnected,
            ]
        );
    }
}
