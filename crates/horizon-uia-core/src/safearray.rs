//! The dynamically-sized typed array wire record (SAFEARRAY).
//!
//! The raw header layout is an external contract: the platform and the
//! external client both index into it directly. The owning [`SafeArray`]
//! wrapper pairs creation with destruction and routes both through the
//! entry-point registry.

use std::ffi::c_void;
use std::ptr::NonNull;

use static_assertions::const_assert_eq;

use crate::error::{ComError, ComResult};
use crate::hresult::HResult;
use crate::runtime::UiaRuntime;
use crate::variant::VarType;

/// Bounds descriptor for one array dimension.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SafeArrayBound {
    pub elements: u32,
    pub lower_bound: i32,
}

/// The raw array header, bit-exact with the platform definition.
///
/// One [`SafeArrayBound`] per dimension follows the header inline;
/// single-dimension arrays use the embedded descriptor. `data` is owned by
/// the array and valid only while `locks` is zero or the array still exists.
#[repr(C)]
#[derive(Debug)]
pub struct SafeArrayHeader {
    pub dims: u16,
    pub features: u16,
    pub element_size: u32,
    pub locks: u32,
    pub data: *mut c_void,
    pub bounds: [SafeArrayBound; 1],
}

#[cfg(target_pointer_width = "64")]
const_assert_eq!(std::mem::size_of::<SafeArrayHeader>(), 32);
#[cfg(target_pointer_width = "64")]
const_assert_eq!(std::mem::offset_of!(SafeArrayHeader, data), 16);
const_assert_eq!(std::mem::offset_of!(SafeArrayHeader, locks), 8);

/// Array feature flags carried in [`SafeArrayHeader::features`].
#[rustfmt::skip]
pub mod features {
    pub const FADF_AUTO: u16        = 0x0001;
    pub const FADF_STATIC: u16      = 0x0002;
    pub const FADF_EMBEDDED: u16    = 0x0004;
    pub const FADF_FIXEDSIZE: u16   = 0x0010;
    pub const FADF_RECORD: u16      = 0x0020;
    pub const FADF_HAVEIID: u16     = 0x0040;
    pub const FADF_HAVEVARTYPE: u16 = 0x0080;
    pub const FADF_BSTR: u16        = 0x0100;
    pub const FADF_UNKNOWN: u16     = 0x0200;
    pub const FADF_DISPATCH: u16    = 0x0400;
    pub const FADF_VARIANT: u16     = 0x0800;
    pub const FADF_RESERVED: u16    = 0xF008;
}

/// An owned single-dimension typed array.
///
/// Created through the registry factory, populated element-by-element with
/// [`put_i32`](Self::put_i32), and destroyed exactly once with
/// [`destroy`](Self::destroy). Arrays handed to the external caller with
/// [`into_raw`](Self::into_raw) transfer ownership instead.
pub struct SafeArray {
    ptr: Option<NonNull<SafeArrayHeader>>,
    element_type: VarType,
}

impl SafeArray {
    /// Create a one-dimensional array of `len` elements of `element_type`,
    /// with the given lower bound.
    pub fn create_vector(
        rt: &dyn UiaRuntime,
        element_type: VarType,
        lower_bound: i32,
        len: u32,
    ) -> ComResult<Self> {
        let raw = rt.create_vector(element_type, lower_bound, len);
        match NonNull::new(raw) {
            Some(ptr) => Ok(Self {
                ptr: Some(ptr),
                element_type,
            }),
            None => Err(ComError::AllocationFailure("SAFEARRAY")),
        }
    }

    /// The declared element type.
    pub fn element_type(&self) -> VarType {
        self.element_type
    }

    /// Element count of the single dimension.
    pub fn len(&self) -> u32 {
        self.header().map_or(0, |h| h.bounds[0].elements)
    }

    /// Whether the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store a 32-bit integer at `index` (in declared-bounds coordinates).
    ///
    /// Fails with `MarshalFailure` if the array's element type is not `I4`
    /// or the platform rejects the index.
    pub fn put_i32(&mut self, rt: &dyn UiaRuntime, index: i32, value: i32) -> ComResult<()> {
        if self.element_type != VarType::I4 {
            return Err(ComError::MarshalFailure("element type is not I4"));
        }
        // SAFETY: value points at 4 readable bytes matching the element size.
        unsafe { self.put(rt, index, &value as *const i32 as *const c_void) }
    }

    /// Store one element at `index`, copying `element_size` bytes from
    /// `value`.
    ///
    /// # Safety
    ///
    /// `value` must point at storage of the array's element size and type.
    pub unsafe fn put(
        &mut self,
        rt: &dyn UiaRuntime,
        index: i32,
        value: *const c_void,
    ) -> ComResult<()> {
        let ptr = self.ptr.ok_or(ComError::MarshalFailure("array destroyed"))?;
        let status = unsafe { rt.put_element(ptr.as_ptr(), index, value) };
        if status.is_err() {
            return Err(ComError::MarshalFailure("element rejected"));
        }
        Ok(())
    }

    /// Destroy the array, freeing header and data.
    ///
    /// Must be called exactly once per array that is not handed off with
    /// [`into_raw`](Self::into_raw).
    pub fn destroy(mut self, rt: &dyn UiaRuntime) -> ComResult<()> {
        let Some(ptr) = self.ptr.take() else {
            return Ok(());
        };
        // SAFETY: ptr came from the registry factory and is cleared above,
        // so no second destroy can reach it.
        let status = unsafe { rt.destroy_array(ptr.as_ptr()) };
        status.ok().map_err(|status| ComError::PlatformCall {
            call: "SafeArrayDestroy",
            status,
        })
    }

    /// Hand the allocation to the external caller, which becomes responsible
    /// for destroying it.
    pub fn into_raw(mut self) -> *mut SafeArrayHeader {
        self.ptr.take().map_or(std::ptr::null_mut(), NonNull::as_ptr)
    }

    fn header(&self) -> Option<&SafeArrayHeader> {
        // SAFETY: ptr is live until destroy/into_raw, which clear it.
        self.ptr.map(|p| unsafe { p.as_ref() })
    }
}

impl Drop for SafeArray {
    fn drop(&mut self) {
        // Creation and destruction must be paired explicitly.
        debug_assert!(
            self.ptr.is_none(),
            "SafeArray dropped without destroy or into_raw"
        );
    }
}

/// Build a one-dimensional `I4` array from a slice, the common shape for
/// runtime-id payloads.
pub fn i32_vector(rt: &dyn UiaRuntime, values: &[i32]) -> ComResult<SafeArray> {
    let mut array = SafeArray::create_vector(rt, VarType::I4, 0, values.len() as u32)?;
    for (i, value) in values.iter().enumerate() {
        if let Err(err) = array.put_i32(rt, i as i32, *value) {
            let _ = array.destroy(rt);
            return Err(err);
        }
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::loopback::LoopbackRuntime;

    #[test]
    fn create_put_destroy_pairing() {
        let rt = LoopbackRuntime::new();
        let mut array = SafeArray::create_vector(&rt, VarType::I4, 0, 3).unwrap();
        assert_eq!(array.len(), 3);

        array.put_i32(&rt, 0, 1).unwrap();
        array.put_i32(&rt, 1, 2).unwrap();
        array.put_i32(&rt, 2, 3).unwrap();

        // One past the declared bounds is rejected, not written.
        let err = array.put_i32(&rt, 3, 4).unwrap_err();
        assert!(matches!(err, ComError::MarshalFailure(_)));

        array.destroy(&rt).unwrap();
    }

    #[test]
    fn wrong_element_kind_is_marshal_failure() {
        let rt = LoopbackRuntime::new();
        let mut array = SafeArray::create_vector(&rt, VarType::BSTR, 0, 1).unwrap();
        let err = array.put_i32(&rt, 0, 7).unwrap_err();
        assert!(matches!(err, ComError::MarshalFailure(_)));
        array.destroy(&rt).unwrap();
    }

    #[test]
    fn i32_vector_helper() {
        let rt = LoopbackRuntime::new();
        let array = i32_vector(&rt, &[10, 20, 30]).unwrap();
        assert_eq!(array.element_type(), VarType::I4);
        assert_eq!(array.len(), 3);
        array.destroy(&rt).unwrap();
    }

    #[test]
    fn empty_vector_is_valid() {
        let rt = LoopbackRuntime::new();
        let array = i32_vector(&rt, &[]).unwrap();
        assert!(array.is_empty());
        array.destroy(&rt).unwrap();
    }
}
