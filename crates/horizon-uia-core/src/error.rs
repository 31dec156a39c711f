//! Error types for the COM plumbing layer.

use thiserror::Error;

use crate::hresult::HResult;

/// Errors raised while marshaling values or calling platform entry points.
///
/// These abort only the single operation that raised them; the objects
/// involved stay in their prior valid state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComError {
    /// Platform string or array storage could not be allocated.
    #[error("platform allocation failed for {0}")]
    AllocationFailure(&'static str),

    /// A value was rejected while building a wire record (wrong element
    /// kind, or indices outside the declared bounds).
    #[error("marshal failure: {0}")]
    MarshalFailure(&'static str),

    /// A platform entry point returned a failure status.
    #[error("platform call {call} failed: {status}")]
    PlatformCall {
        call: &'static str,
        status: HResult,
    },
}

impl ComError {
    /// Collapse to the fixed boundary status vocabulary.
    pub fn to_hresult(&self) -> HResult {
        match self {
            Self::AllocationFailure(_) => HResult::OUT_OF_MEMORY,
            Self::MarshalFailure(_) => HResult::INVALID_ARG,
            Self::PlatformCall { status, .. } => *status,
        }
    }
}

/// A specialized `Result` for COM plumbing operations.
pub type ComResult<T> = Result<T, ComError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_mapping() {
        assert_eq!(
            ComError::AllocationFailure("BSTR").to_hresult(),
            HResult::OUT_OF_MEMORY
        );
        assert_eq!(
            ComError::MarshalFailure("bad index").to_hresult(),
            HResult::INVALID_ARG
        );
        let e = ComError::PlatformCall {
            call: "SafeArrayDestroy",
            status: HResult::FAIL,
        };
        assert_eq!(e.to_hresult(), HResult::FAIL);
    }
}
