//! Native UI Automation provider bridge.
//!
//! This crate lets an application expose its UI elements to an external
//! accessibility client (a screen reader or UI test driver) as native
//! providers, with no object-model runtime underneath:
//!
//! - **Capability tables**: hand-built function-pointer tables per
//!   interface, with the layout frozen at compile time ([`vtable`])
//! - **Provider objects**: reference-counted, atomically disconnectable
//!   native objects composed from a capability subset ([`ProviderBuilder`],
//!   [`ProviderRef`])
//! - **Event emission**: structure, property, event, notification and
//!   bulk-change signaling toward the client ([`events`])
//! - **Host integration**: the window-message handshake and teardown
//!   ordering ([`host`])
//!
//! Marshaling and the platform entry-point registry live in
//! [`horizon_uia_core`], re-exported under [`core`].
//!
//! # Example
//!
//! ```
//! use horizon_uia::events;
//! use horizon_uia::ids::{NotificationKind, NotificationProcessing};
//! use horizon_uia::{Capability, ProviderBuilder, ProviderHandler};
//!
//! struct SaveButton;
//!
//! impl ProviderHandler for SaveButton {
//!     fn invoke(&self) -> horizon_uia::Result<()> {
//!         // Trigger the application action here.
//!         Ok(())
//!     }
//! }
//!
//! let provider = ProviderBuilder::new(SaveButton)
//!     .capability(Capability::Fragment)
//!     .capability(Capability::Invoke)
//!     .runtime_id(vec![1, 17])
//!     .build();
//!
//! // From the window procedure, on host::is_identity_query messages:
//! // return host::return_provider(hwnd, wparam, lparam, &provider);
//!
//! events::raise_notification(
//!     &provider,
//!     NotificationKind::ActionCompleted,
//!     NotificationProcessing::All,
//!     "Saved",
//!     "document-saved",
//! )
//! .ok();
//!
//! // Before the window goes away:
//! provider.disconnect().unwrap();
//! ```

pub mod events;
mod error;
pub mod host;
pub mod ids;
mod provider;
pub mod vtable;

/// The COM plumbing layer (wire records and entry-point registry).
pub use horizon_uia_core as core;

pub use error::{Result, UiaError};
pub use provider::{
    Capability, InterfaceHandle, Provider, ProviderBuilder, ProviderHandler, ProviderRef,
    ScrollState,
};
