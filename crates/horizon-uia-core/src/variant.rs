//! The tagged-union wire record (VARIANT) and its marshaling rules.
//!
//! A [`Variant`] is created empty, mutated in place by typed setters, decoded
//! on read into a host [`Value`], and explicitly released before reuse or
//! destruction. The payload's interpretation is fully determined by the type
//! tag; no payload byte is meaningful until the tag is set.
//!
//! Ownership is single-owner and release is exactly-once by construction:
//! releasing writes the empty sentinel back into the record, so a second
//! release is a no-op rather than a double free.

use std::ffi::c_void;
use std::fmt;

use static_assertions::const_assert_eq;

use crate::bstr;
use crate::error::{ComError, ComResult};
use crate::runtime::UiaRuntime;
use crate::unknown;

/// The numeric type tag carried in a [`Variant`].
///
/// The codes are the platform's VARENUM table and must match it exactly; the
/// external client decodes the record memory directly.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct VarType(pub u16);

#[rustfmt::skip]
impl VarType {
    pub const EMPTY: Self            = Self(0);
    pub const NULL: Self             = Self(1);
    pub const I2: Self               = Self(2);
    pub const I4: Self               = Self(3);
    pub const R4: Self               = Self(4);
    pub const R8: Self               = Self(5);
    pub const CY: Self               = Self(6);
    pub const DATE: Self             = Self(7);
    pub const BSTR: Self             = Self(8);
    pub const DISPATCH: Self         = Self(9);
    pub const ERROR: Self            = Self(10);
    pub const BOOL: Self             = Self(11);
    pub const VARIANT: Self          = Self(12);
    pub const UNKNOWN: Self          = Self(13);
    pub const DECIMAL: Self          = Self(14);
    pub const I1: Self               = Self(16);
    pub const UI1: Self              = Self(17);
    pub const UI2: Self              = Self(18);
    pub const UI4: Self              = Self(19);
    pub const I8: Self               = Self(20);
    pub const UI8: Self              = Self(21);
    pub const INT: Self              = Self(22);
    pub const UINT: Self             = Self(23);
    pub const VOID: Self             = Self(24);
    pub const HRESULT: Self          = Self(25);
    pub const PTR: Self              = Self(26);
    pub const SAFEARRAY: Self        = Self(27);
    pub const CARRAY: Self           = Self(28);
    pub const USERDEFINED: Self      = Self(29);
    pub const LPSTR: Self            = Self(30);
    pub const LPWSTR: Self           = Self(31);
    pub const RECORD: Self           = Self(36);
    pub const INT_PTR: Self          = Self(37);
    pub const UINT_PTR: Self         = Self(38);
    pub const FILETIME: Self         = Self(64);
    pub const BLOB: Self             = Self(65);
    pub const STREAM: Self           = Self(66);
    pub const STORAGE: Self          = Self(67);
    pub const STREAMED_OBJECT: Self  = Self(68);
    pub const STORED_OBJECT: Self    = Self(69);
    pub const BLOB_OBJECT: Self      = Self(70);
    pub const CF: Self               = Self(71);
    pub const CLSID: Self            = Self(72);
    pub const VERSIONED_STREAM: Self = Self(73);
    pub const BSTR_BLOB: Self        = Self(0x0fff);
    pub const VECTOR: Self           = Self(0x1000);
    pub const ARRAY: Self            = Self(0x2000);
    pub const BYREF: Self            = Self(0x4000);
    pub const RESERVED: Self         = Self(0x8000);
    pub const ILLEGAL: Self          = Self(0xffff);
    pub const TYPEMASK: Self         = Self(0x0fff);
}

/// A host-side projection of a decoded [`Variant`].
///
/// Unknown or unsupported tags decode to [`Value::Empty`]; absence of a value
/// is a valid outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Bool(bool),
    I32(i32),
    String(String),
    /// An opaque object reference, carried as the raw interface address.
    Object(usize),
}

/// The fixed-layout tagged-union wire record.
///
/// 24 bytes on 64-bit targets: a four-`u16` header followed by a 16-byte
/// payload, matching the platform definition the external client reads.
#[repr(C)]
pub struct Variant {
    vt: VarType,
    reserved1: u16,
    reserved2: u16,
    reserved3: u16,
    data: [usize; 2],
}

#[cfg(target_pointer_width = "64")]
const_assert_eq!(std::mem::size_of::<Variant>(), 24);
const_assert_eq!(std::mem::offset_of!(Variant, data), 8);

impl Variant {
    /// A new record with the empty tag and an all-zero payload.
    pub const fn empty() -> Self {
        Self {
            vt: VarType::EMPTY,
            reserved1: 0,
            reserved2: 0,
            reserved3: 0,
            data: [0; 2],
        }
    }

    /// The current type tag.
    pub fn var_type(&self) -> VarType {
        self.vt
    }

    /// Whether the payload holds a reference that must be released.
    pub fn owns_reference(&self) -> bool {
        matches!(
            self.vt,
            VarType::BSTR | VarType::UNKNOWN | VarType::DISPATCH
        ) && self.data[0] != 0
    }

    /// Encode a boolean.
    ///
    /// True is the all-bits-set sentinel, per platform convention; anything
    /// non-zero decodes as true.
    pub fn set_bool(&mut self, value: bool) {
        debug_assert!(!self.owns_reference(), "encoding over an unreleased value");
        self.vt = VarType::BOOL;
        self.data = [if value { usize::MAX } else { 0 }, 0];
    }

    /// Encode a 32-bit signed integer.
    pub fn set_i32(&mut self, value: i32) {
        debug_assert!(!self.owns_reference(), "encoding over an unreleased value");
        self.vt = VarType::I4;
        self.data = [value as isize as usize, 0];
    }

    /// Encode a string, allocating platform string storage.
    ///
    /// Ownership of the allocation transfers to the record; it is freed by
    /// [`release`](Self::release). Fails with `AllocationFailure` if the
    /// platform cannot allocate; the record is left untouched.
    pub fn set_string(&mut self, rt: &dyn UiaRuntime, value: &str) -> ComResult<()> {
        debug_assert!(!self.owns_reference(), "encoding over an unreleased value");
        let bstr = rt.alloc_string(value);
        if bstr.is_null() {
            return Err(ComError::AllocationFailure("BSTR"));
        }
        self.vt = VarType::BSTR;
        self.data = [bstr as usize, 0];
        Ok(())
    }

    /// Encode an object reference, adding a reference of our own.
    ///
    /// # Safety
    ///
    /// `punk` must be a live interface pointer with IUnknown slots in front.
    pub unsafe fn set_object(&mut self, punk: *mut c_void) {
        debug_assert!(!self.owns_reference(), "encoding over an unreleased value");
        unsafe { unknown::add_ref(punk) };
        self.vt = VarType::UNKNOWN;
        self.data = [punk as usize, 0];
    }

    /// Decode the record into a host value.
    ///
    /// Tags outside the supported set decode to [`Value::Empty`].
    pub fn value(&self) -> Value {
        match self.vt {
            VarType::BOOL => Value::Bool(self.data[0] != 0),
            VarType::I4 => Value::I32(self.data[0] as u32 as i32),
            VarType::BSTR => {
                let bstr = self.data[0] as *const u16;
                if bstr.is_null() {
                    Value::Empty
                } else {
                    // SAFETY: a BSTR tag with a non-null payload means we (or
                    // the external caller) own a live platform string here.
                    Value::String(unsafe { bstr::to_string(bstr) })
                }
            }
            VarType::UNKNOWN | VarType::DISPATCH if self.data[0] != 0 => {
                Value::Object(self.data[0])
            }
            _ => Value::Empty,
        }
    }

    /// Release the owned payload, if any, and reset to the empty sentinel.
    ///
    /// Exactly-once by construction: after the first call the record is
    /// empty, so further calls are no-ops.
    pub fn release(&mut self, rt: &dyn UiaRuntime) {
        match self.vt {
            VarType::BSTR => {
                let bstr = self.data[0] as *mut u16;
                if !bstr.is_null() {
                    // SAFETY: the BSTR tag marks an owned allocation, and the
                    // sentinel write below prevents a second free.
                    unsafe { rt.free_string(bstr) };
                }
            }
            VarType::UNKNOWN | VarType::DISPATCH => {
                let punk = self.data[0] as *mut c_void;
                if !punk.is_null() {
                    // SAFETY: the tag marks a reference we own.
                    unsafe { unknown::release(punk) };
                }
            }
            _ => {}
        }
        // Reset fields in place; a struct assignment would run `Drop` on the
        // still-tagged old value.
        self.vt = VarType::EMPTY;
        self.reserved1 = 0;
        self.reserved2 = 0;
        self.reserved3 = 0;
        self.data = [0; 2];
    }

    /// Raw pointer to the record, for platform calls.
    pub fn as_ptr(&self) -> *const Variant {
        self
    }

    /// Raw mutable pointer to the record, for platform out-parameters.
    pub fn as_mut_ptr(&mut self) -> *mut Variant {
        self
    }
}

impl Default for Variant {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variant")
            .field("vt", &self.vt)
            .field("value", &self.value())
            .finish()
    }
}

impl Drop for Variant {
    fn drop(&mut self) {
        // Owned payloads must be released explicitly; dropping one silently
        // would leak platform storage.
        debug_assert!(
            !self.owns_reference(),
            "variant dropped while owning a reference (vt={:?})",
            self.vt
        );
    }
}

/// One entry of a bulk-changes notification: an event id plus two payload
/// records. Field order and layout are read directly by the platform.
#[repr(C)]
#[derive(Debug, Default)]
pub struct UiaChangeInfo {
    pub uia_id: i32,
    pub payload: Variant,
    pub extra_info: Variant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::loopback::LoopbackRuntime;

    #[test]
    fn bool_round_trip_uses_all_bits_sentinel() {
        let mut v = Variant::empty();
        v.set_bool(true);
        assert_eq!(v.var_type(), VarType::BOOL);
        assert_eq!(v.data[0], usize::MAX);
        assert_eq!(v.value(), Value::Bool(true));

        v.set_bool(false);
        assert_eq!(v.value(), Value::Bool(false));
    }

    #[test]
    fn i32_round_trip() {
        let mut v = Variant::empty();
        v.set_i32(-42);
        assert_eq!(v.value(), Value::I32(-42));
        v.set_i32(i32::MAX);
        assert_eq!(v.value(), Value::I32(i32::MAX));
    }

    #[test]
    fn string_round_trip_and_single_release() {
        let rt = LoopbackRuntime::new();
        let mut v = Variant::empty();
        v.set_string(&rt, "toolbar").unwrap();
        assert_eq!(v.var_type(), VarType::BSTR);
        assert_eq!(v.value(), Value::String("toolbar".into()));

        v.release(&rt);
        // The empty sentinel marks the value as released; decoding now yields
        // "no value" and a second release is a no-op.
        assert_eq!(v.var_type(), VarType::EMPTY);
        assert_eq!(v.value(), Value::Empty);
        v.release(&rt);
        assert_eq!(v.value(), Value::Empty);
    }

    #[test]
    fn unknown_tag_decodes_to_empty() {
        let mut v = Variant::empty();
        v.vt = VarType::DATE;
        v.data = [12345, 0];
        assert_eq!(v.value(), Value::Empty);
        // Avoid tripping the drop assertion: DATE owns nothing.
        assert!(!v.owns_reference());
    }

    #[test]
    fn empty_is_all_zero() {
        let v = Variant::empty();
        assert_eq!(v.var_type(), VarType::EMPTY);
        assert_eq!(v.value(), Value::Empty);
        assert_eq!(v.data, [0, 0]);
    }
}
