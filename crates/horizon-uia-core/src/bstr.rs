//! Helpers for platform string storage (BSTR).
//!
//! A BSTR points at UTF-16 data that is preceded by a 4-byte byte-length
//! prefix and followed by a null terminator. Allocation and release go
//! through the entry-point registry; the helpers here only read.

/// Encode a string as null-terminated UTF-16, for passing to entry points
/// that take a plain wide-character pointer.
pub fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Character length of a BSTR, read from its length prefix.
///
/// # Safety
///
/// `bstr` must be a live BSTR allocation (prefix included) that is not freed
/// for the duration of the call.
pub unsafe fn len(bstr: *const u16) -> usize {
    let byte_len = unsafe { (bstr as *const u8).sub(4).cast::<u32>().read_unaligned() };
    byte_len as usize / 2
}

/// Decode a BSTR into an owned `String`.
///
/// # Safety
///
/// Same contract as [`len`].
pub unsafe fn to_string(bstr: *const u16) -> String {
    let chars = unsafe { std::slice::from_raw_parts(bstr, len(bstr)) };
    String::from_utf16_lossy(chars)
}

/// Decode a null-terminated wide-character pointer (not a BSTR) into an
/// owned `String`.
///
/// # Safety
///
/// `wide` must point at a null-terminated UTF-16 sequence.
pub unsafe fn wide_to_string(wide: *const u16) -> String {
    let mut end = wide;
    // SAFETY: caller guarantees a terminator exists.
    unsafe {
        while *end != 0 {
            end = end.add(1);
        }
        let chars = std::slice::from_raw_parts(wide, end.offset_from(wide) as usize);
        String::from_utf16_lossy(chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_round_trip() {
        let wide = to_wide("status: ready");
        assert_eq!(*wide.last().unwrap(), 0);
        let back = unsafe { wide_to_string(wide.as_ptr()) };
        assert_eq!(back, "status: ready");
    }

    #[test]
    fn bstr_layout_read() {
        // Hand-build a BSTR-shaped buffer: 4-byte length prefix, data, null.
        let mut buf: Vec<u16> = vec![0, 0];
        buf.extend("abc".encode_utf16());
        buf.push(0);
        let byte_len = (buf.len() as u32 - 3) * 2;
        unsafe {
            (buf.as_mut_ptr() as *mut u32).write_unaligned(byte_len);
            let bstr = buf.as_ptr().add(2);
            assert_eq!(len(bstr), 3);
            assert_eq!(to_string(bstr), "abc");
        }
    }
}
