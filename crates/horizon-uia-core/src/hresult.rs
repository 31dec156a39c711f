//! Boundary status codes.
//!
//! Every operation that crosses the component binary interface returns one of
//! a fixed, small set of status codes; the external caller understands no
//! richer vocabulary. Richer Rust-side errors are mapped down to this set at
//! the boundary (see [`crate::error::ComError`]).

use std::fmt;

/// A platform status code (`HRESULT`).
///
/// Negative values signal failure; zero is success. Only the constants below
/// are ever returned across the boundary.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HResult(pub i32);

impl HResult {
    /// The operation succeeded.
    pub const OK: Self = Self(0);
    /// The operation was aborted.
    pub const ABORT: Self = Self(0x8000_4004u32 as i32);
    /// Access was denied.
    pub const ACCESS_DENIED: Self = Self(0x8007_0005u32 as i32);
    /// Unspecified failure.
    pub const FAIL: Self = Self(0x8000_4005u32 as i32);
    /// An invalid handle was passed.
    pub const INVALID_HANDLE: Self = Self(0x8007_0006u32 as i32);
    /// An argument was invalid.
    pub const INVALID_ARG: Self = Self(0x8007_0057u32 as i32);
    /// The requested interface is not supported.
    pub const NO_INTERFACE: Self = Self(0x8000_4002u32 as i32);
    /// The operation is not implemented.
    pub const NOT_IMPL: Self = Self(0x8000_4001u32 as i32);
    /// Memory allocation failed.
    pub const OUT_OF_MEMORY: Self = Self(0x8007_000Eu32 as i32);
    /// A required pointer was null.
    pub const NULL_POINTER: Self = Self(0x8000_4003u32 as i32);
    /// Catastrophic, unexpected failure.
    pub const UNEXPECTED: Self = Self(0x8000_FFFFu32 as i32);

    /// Whether this status signals success.
    pub const fn is_ok(self) -> bool {
        self.0 >= 0
    }

    /// Whether this status signals failure.
    pub const fn is_err(self) -> bool {
        self.0 < 0
    }

    /// Convert to a `Result`, keeping the failure code.
    pub fn ok(self) -> Result<(), HResult> {
        if self.is_ok() { Ok(()) } else { Err(self) }
    }

    fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::OK => "S_OK",
            Self::ABORT => "E_ABORT",
            Self::ACCESS_DENIED => "E_ACCESSDENIED",
            Self::FAIL => "E_FAIL",
            Self::INVALID_HANDLE => "E_HANDLE",
            Self::INVALID_ARG => "E_INVALIDARG",
            Self::NO_INTERFACE => "E_NOINTERFACE",
            Self::NOT_IMPL => "E_NOTIMPL",
            Self::OUT_OF_MEMORY => "E_OUTOFMEMORY",
            Self::NULL_POINTER => "E_POINTER",
            Self::UNEXPECTED => "E_UNEXPECTED",
            _ => return None,
        })
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "HRESULT({:#010x})", self.0 as u32),
        }
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_numeric_codes() {
        // The external client decodes these numerically; they are a wire
        // contract, not an implementation choice.
        assert_eq!(HResult::OK.0 as u32, 0x0000_0000);
        assert_eq!(HResult::ABORT.0 as u32, 0x8000_4004);
        assert_eq!(HResult::ACCESS_DENIED.0 as u32, 0x8007_0005);
        assert_eq!(HResult::FAIL.0 as u32, 0x8000_4005);
        assert_eq!(HResult::INVALID_HANDLE.0 as u32, 0x8007_0006);
        assert_eq!(HResult::INVALID_ARG.0 as u32, 0x8007_0057);
        assert_eq!(HResult::NO_INTERFACE.0 as u32, 0x8000_4002);
        assert_eq!(HResult::NOT_IMPL.0 as u32, 0x8000_4001);
        assert_eq!(HResult::OUT_OF_MEMORY.0 as u32, 0x8007_000E);
        assert_eq!(HResult::NULL_POINTER.0 as u32, 0x8000_4003);
        assert_eq!(HResult::UNEXPECTED.0 as u32, 0x8000_FFFF);
    }

    #[test]
    fn success_and_failure_split() {
        assert!(HResult::OK.is_ok());
        assert!(HResult::FAIL.is_err());
        assert!(HResult::FAIL.ok().is_err());
        assert_eq!(HResult::OK.ok(), Ok(()));
    }
}
