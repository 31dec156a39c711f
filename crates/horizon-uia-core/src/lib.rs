//! COM plumbing for Horizon UIA.
//!
//! This crate provides the wire-level foundations of the accessibility
//! bridge, with no object-model runtime underneath:
//!
//! - **Wire records**: the tagged-union value record ([`Variant`]), the
//!   typed array record ([`SafeArray`]), interface identities ([`Guid`]) and
//!   the fixed boundary status vocabulary ([`HResult`]). Layouts are frozen
//!   with compile-time assertions because the external client reads this
//!   memory directly.
//! - **Ownership rules**: platform string and array storage is single-owner
//!   and released exactly once; the empty sentinel written on release makes
//!   a double free unrepresentable.
//! - **Entry-point registry**: the platform entry points are resolved once
//!   per process and exposed through the [`UiaRuntime`] capability trait, so
//!   tests can swap in the [`runtime::loopback::LoopbackRuntime`] and assert
//!   on a journal of recorded calls.
//!
//! # Marshaling example
//!
//! ```
//! use horizon_uia_core::{runtime::runtime, Value, Variant};
//!
//! let rt = runtime();
//! let mut record = Variant::empty();
//! record.set_string(rt, "Save").unwrap();
//! assert_eq!(record.value(), Value::String("Save".into()));
//! record.release(rt);
//! assert_eq!(record.value(), Value::Empty);
//! ```

pub mod bstr;
mod error;
mod guid;
mod hresult;
pub mod runtime;
pub mod safearray;
pub mod unknown;
pub mod variant;

pub use error::{ComError, ComResult};
pub use guid::{Guid, IID_IUNKNOWN};
pub use hresult::HResult;
pub use runtime::{UiaRuntime, install_runtime, runtime};
pub use safearray::{SafeArray, SafeArrayBound, SafeArrayHeader};
pub use unknown::{AddRefFn, IUnknownVtbl, QueryInterfaceFn, ReleaseFn};
pub use variant::{UiaChangeInfo, Value, VarType, Variant};
