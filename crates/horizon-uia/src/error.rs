//! Error types for the provider bridge.

use thiserror::Error;

use horizon_uia_core::{ComError, HResult};

/// Errors surfaced by the bridge.
///
/// Negotiation misses and disconnected-state hits are ordinary control flow;
/// marshaling failures abort only the operation that raised them. Nothing in
/// this taxonomy may terminate the hosting process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UiaError {
    /// Interface negotiation missed. Callers are expected to probe multiple
    /// identities, so this is a status, not a fault.
    #[error("the requested interface is not supported")]
    NotSupported,

    /// The provider was disconnected; the operation was not performed.
    #[error("the provider is disconnected")]
    Disconnected,

    /// An event or notification call failed at the platform. Soft: callers
    /// log and move on, the provider is unaffected.
    #[error("notification failed with status {0}")]
    NotificationFailed(HResult),

    /// A marshaling or plumbing error from the COM layer.
    #[error(transparent)]
    Com(#[from] ComError),

    /// Any other boundary call returning non-success.
    #[error("platform call {call} failed: {status}")]
    PlatformCallFailure {
        call: &'static str,
        status: HResult,
    },
}

impl UiaError {
    /// Collapse to the fixed boundary status vocabulary.
    ///
    /// The external caller has no code for "disconnected"; that state is
    /// reported as the benign generic failure.
    pub fn to_hresult(&self) -> HResult {
        match self {
            Self::NotSupported => HResult::NO_INTERFACE,
            Self::Disconnected => HResult::FAIL,
            Self::NotificationFailed(status) => *status,
            Self::Com(err) => err.to_hresult(),
            Self::PlatformCallFailure { status, .. } => *status,
        }
    }
}

/// A specialized `Result` for bridge operations.
pub type Result<T> = std::result::Result<T, UiaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_mapping() {
        assert_eq!(UiaError::NotSupported.to_hresult(), HResult::NO_INTERFACE);
        assert_eq!(UiaError::Disconnected.to_hresult(), HResult::FAIL);
        assert_eq!(
            UiaError::NotificationFailed(HResult::UNEXPECTED).to_hresult(),
            HResult::UNEXPECTED
        );
        assert_eq!(
            UiaError::from(ComError::AllocationFailure("BSTR")).to_hresult(),
            HResult::OUT_OF_MEMORY
        );
    }
}
