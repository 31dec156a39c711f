//! The event and notification emitter.
//!
//! Wraps the asynchronous signaling mechanisms the external client listens
//! on: structure changes, property changes, plain automation events,
//! out-of-band notifications and bulk change batches. Each call validates
//! its payload, marshals it through the wire records and forwards it to the
//! platform through the entry-point registry.
//!
//! All of them fail softly: a non-success platform status comes back as the
//! recoverable [`UiaError::NotificationFailed`], is logged, and never
//! affects the provider's reference count or lifetime.

use std::ptr;

use horizon_uia_core::{ComError, HResult, UiaChangeInfo, Variant, runtime};

use crate::error::{Result, UiaError};
use crate::ids::{
    EventId, NotificationKind, NotificationProcessing, PropertyId, StructureChangeType,
};
use crate::provider::ProviderRef;

/// The provider's boundary pointer, refused once disconnected.
fn target(provider: &ProviderRef) -> Result<*mut std::ffi::c_void> {
    if provider.is_disconnected() {
        return Err(UiaError::Disconnected);
    }
    Ok(provider.simple_ptr())
}

/// Translate a platform status into the soft failure contract.
fn soft(status: HResult, call: &'static str) -> Result<()> {
    if status.is_err() {
        tracing::debug!(target: "horizon_uia::events", call, %status, "notification failed");
        return Err(UiaError::NotificationFailed(status));
    }
    Ok(())
}

/// Announce a structural change around an element.
///
/// `runtime_id` identifies the affected element and must be stable across
/// calls for the same element; an empty id is a valid degenerate payload
/// and is forwarded as such.
pub fn raise_structure_changed(
    provider: &ProviderRef,
    change: StructureChangeType,
    runtime_id: &[i32],
) -> Result<()> {
    let target = target(provider)?;
    let id_ptr = if runtime_id.is_empty() {
        ptr::null()
    } else {
        runtime_id.as_ptr()
    };
    // SAFETY: target is live (the caller's reference pins it) and the id
    // slice outlives the call.
    let status = unsafe {
        runtime().raise_structure_changed(target, change as u32, id_ptr, runtime_id.len() as i32)
    };
    soft(status, "UiaRaiseStructureChangedEvent")
}

/// Announce a property transition.
///
/// The emitter borrows `old` and `new`; ownership and release of both
/// records stay with the caller after the call returns.
pub fn raise_property_changed(
    provider: &ProviderRef,
    property: PropertyId,
    old: &Variant,
    new: &Variant,
) -> Result<()> {
    let target = target(provider)?;
    // SAFETY: both records are live borrows for the duration of the call.
    let status = unsafe {
        runtime().raise_property_changed(target, property.0, old.as_ptr(), new.as_ptr())
    };
    soft(status, "UiaRaiseAutomationPropertyChangedEvent")
}

/// Fire a plain automation event. Fire-and-forget: the soft failure is for
/// logging, nothing more.
pub fn raise_automation_event(provider: &ProviderRef, event: EventId) -> Result<()> {
    let target = target(provider)?;
    // SAFETY: target is live for the duration of the call.
    let status = unsafe { runtime().raise_automation_event(target, event.0) };
    soft(status, "UiaRaiseAutomationEvent")
}

/// Send an out-of-band notification with display text and an activity id.
///
/// `processing` advises the client how to coalesce rapid repeats; the
/// emitter does not enforce it.
pub fn raise_notification(
    provider: &ProviderRef,
    kind: NotificationKind,
    processing: NotificationProcessing,
    display: &str,
    activity_id: &str,
) -> Result<()> {
    let target = target(provider)?;
    let rt = runtime();

    // Both strings are platform allocations owned here for exactly the
    // duration of the call.
    let display = rt.alloc_string(display);
    if display.is_null() {
        return Err(ComError::AllocationFailure("BSTR").into());
    }
    let activity_id = rt.alloc_string(activity_id);
    if activity_id.is_null() {
        // SAFETY: display was allocated just above and not shared.
        unsafe { rt.free_string(display) };
        return Err(ComError::AllocationFailure("BSTR").into());
    }

    // SAFETY: both strings are live until freed below; target is pinned by
    // the caller's reference.
    let status = unsafe {
        rt.raise_notification(target, kind as u32, processing as u32, display, activity_id)
    };
    // SAFETY: freed exactly once, after the platform call returns.
    unsafe {
        rt.free_string(display);
        rt.free_string(activity_id);
    }

    soft(status, "UiaRaiseNotificationEvent")
}

/// Announce a batch of changes in one call.
///
/// The records stay owned by the caller, like property-change payloads.
pub fn raise_changes(provider: &ProviderRef, changes: &[UiaChangeInfo]) -> Result<()> {
    let target = target(provider)?;
    let ptr = if changes.is_empty() {
        ptr::null()
    } else {
        changes.as_ptr()
    };
    // SAFETY: the slice outlives the call.
    let status = unsafe { runtime().raise_changes(target, changes.len() as i32, ptr) };
    soft(status, "UiaRaiseChangesEvent")
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_uia_core::Value;
    use horizon_uia_core::runtime::loopback::JournalEntry;
    use parking_lot::Mutex;

    use crate::ids::ControlTypeId;
    use crate::provider::{Capability, ProviderBuilder, ProviderHandler};

    struct Label;

    impl ProviderHandler for Label {}

    /// The journal is process-global; serialize the tests that drain it.
    static JOURNAL_LOCK: Mutex<()> = Mutex::new(());

    fn provider() -> ProviderRef {
        ProviderBuilder::new(Label)
            .capability(Capability::Fragment)
            .runtime_id(vec![3, 1, 4])
            .build()
    }

    #[test]
    fn structure_change_reaches_the_platform() {
        let _guard = JOURNAL_LOCK.lock();
        let Some(journal) = runtime().journal() else {
            return;
        };
        let provider = provider();

        raise_structure_changed(&provider, StructureChangeType::ChildAdded, &[3, 1, 4]).unwrap();

        let entries = journal.take();
        assert!(entries.contains(&JournalEntry::StructureChanged {
            provider: provider.simple_ptr() as usize,
            change_type: StructureChangeType::ChildAdded as u32,
            runtime_id: vec![3, 1, 4],
        }));
    }

    #[test]
    fn empty_runtime_id_still_returns_a_status() {
        let _guard = JOURNAL_LOCK.lock();
        let Some(journal) = runtime().journal() else {
            return;
        };
        let provider = provider();

        // Degenerate payload: no element id at all. The call must still
        // complete with a status, not crash.
        raise_structure_changed(&provider, StructureChangeType::ChildrenInvalidated, &[]).unwrap();

        let entries = journal.take();
        assert!(entries.contains(&JournalEntry::StructureChanged {
            provider: provider.simple_ptr() as usize,
            change_type: StructureChangeType::ChildrenInvalidated as u32,
            runtime_id: vec![],
        }));
    }

    #[test]
    fn property_change_payloads_stay_caller_owned() {
        let _guard = JOURNAL_LOCK.lock();
        let Some(journal) = runtime().journal() else {
            return;
        };
        let rt = runtime();
        let provider = provider();

        let mut old = Variant::empty();
        old.set_string(rt, "0%").unwrap();
        let mut new = Variant::empty();
        new.set_string(rt, "50%").unwrap();

        raise_property_changed(&provider, PropertyId::VALUE_VALUE, &old, &new).unwrap();

        // The emitter borrowed the records; we still own and release them.
        assert_eq!(old.value(), Value::String("0%".into()));
        old.release(rt);
        new.release(rt);

        let entries = journal.take();
        assert!(entries.contains(&JournalEntry::PropertyChanged {
            provider: provider.simple_ptr() as usize,
            property_id: PropertyId::VALUE_VALUE.0,
            old: Value::String("0%".into()),
            new: Value::String("50%".into()),
        }));
    }

    #[test]
    fn automation_event_and_notification() {
        let _guard = JOURNAL_LOCK.lock();
        let Some(journal) = runtime().journal() else {
            return;
        };
        let provider = provider();

        raise_automation_event(&provider, EventId::INVOKE_INVOKED).unwrap();
        raise_notification(
            &provider,
            NotificationKind::ActionCompleted,
            NotificationProcessing::ImportantMostRecent,
            "Download finished",
            "download-complete",
        )
        .unwrap();

        let entries = journal.take();
        assert!(entries.contains(&JournalEntry::AutomationEvent {
            provider: provider.simple_ptr() as usize,
            event_id: EventId::INVOKE_INVOKED.0,
        }));
        assert!(entries.contains(&JournalEntry::Notification {
            provider: provider.simple_ptr() as usize,
            kind: NotificationKind::ActionCompleted as u32,
            processing: NotificationProcessing::ImportantMostRecent as u32,
            display: "Download finished".into(),
            activity_id: "download-complete".into(),
        }));
    }

    #[test]
    fn change_batches_forward_every_record() {
        let _guard = JOURNAL_LOCK.lock();
        let Some(journal) = runtime().journal() else {
            return;
        };
        let provider = provider();

        let changes = [
            UiaChangeInfo {
                uia_id: ControlTypeId::LIST.0 as i32,
                payload: Variant::empty(),
                extra_info: Variant::empty(),
            },
            UiaChangeInfo {
                uia_id: ControlTypeId::LIST_ITEM.0 as i32,
                payload: Variant::empty(),
                extra_info: Variant::empty(),
            },
        ];
        raise_changes(&provider, &changes).unwrap();

        let entries = journal.take();
        assert!(entries.contains(&JournalEntry::Changes {
            provider: provider.simple_ptr() as usize,
            uia_ids: vec![
                ControlTypeId::LIST.0 as i32,
                ControlTypeId::LIST_ITEM.0 as i32
            ],
        }));
    }

    #[test]
    fn disconnected_provider_refuses_events() {
        let _guard = JOURNAL_LOCK.lock();
        let provider = provider();
        provider.disconnect().unwrap();

        assert_eq!(
            raise_automation_event(&provider, EventId::MENU_OPENED).unwrap_err(),
            UiaError::Disconnected
        );
        assert_eq!(
            raise_structure_changed(&provider, StructureChangeType::ChildRemoved, &[1])
                .unwrap_err(),
            UiaError::Disconnected
        );
    }
}
