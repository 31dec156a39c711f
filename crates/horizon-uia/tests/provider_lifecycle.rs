//! Integration tests for provider lifetime, negotiation and teardown under
//! the exact call sequences an external client drives.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use horizon_uia::core::unknown;
use horizon_uia::core::{IID_IUNKNOWN, runtime};
use horizon_uia::ids::StructureChangeType;
use horizon_uia::vtable::{
    IID_FRAGMENT_PROVIDER, IID_INVOKE_PROVIDER, IID_SIMPLE_PROVIDER, IID_VALUE_PROVIDER,
};
use horizon_uia::{Capability, ProviderBuilder, ProviderHandler, ProviderRef, UiaError, events};

struct Element {
    invoked: AtomicUsize,
    dropped: Arc<AtomicBool>,
}

impl ProviderHandler for Element {
    fn invoke(&self) -> horizon_uia::Result<()> {
        self.invoked.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl Drop for Element {
    fn drop(&mut self) {
        self.dropped.store(true, Ordering::Release);
    }
}

fn element_provider() -> (ProviderRef, Arc<AtomicBool>) {
    let dropped = Arc::new(AtomicBool::new(false));
    let provider = ProviderBuilder::new(Element {
        invoked: AtomicUsize::new(0),
        dropped: dropped.clone(),
    })
    .capability(Capability::Fragment)
    .capability(Capability::Invoke)
    .runtime_id(vec![8, 800])
    .build();
    (provider, dropped)
}

#[test]
fn negotiation_over_composed_tables() {
    let (provider, _) = element_provider();

    let unknown_if = provider.query_interface(&IID_IUNKNOWN).unwrap();
    let simple = provider.query_interface(&IID_SIMPLE_PROVIDER).unwrap();
    let fragment = provider.query_interface(&IID_FRAGMENT_PROVIDER).unwrap();
    let invoke = provider.query_interface(&IID_INVOKE_PROVIDER).unwrap();

    // IUnknown resolves to the simple head; the capabilities are distinct
    // tables at distinct addresses.
    assert_eq!(unknown_if.as_ptr(), simple.as_ptr());
    assert_ne!(simple.as_ptr(), fragment.as_ptr());
    assert_ne!(fragment.as_ptr(), invoke.as_ptr());

    // Value was not composed; the miss is a status, not a fault.
    assert_eq!(
        provider.query_interface(&IID_VALUE_PROVIDER).unwrap_err(),
        UiaError::NotSupported
    );
}

#[test]
fn reference_count_drives_the_lifetime() {
    let (provider, dropped) = element_provider();
    assert_eq!(provider.ref_count(), 1);

    // Three successful negotiations take the count to four.
    let a = provider.query_interface(&IID_SIMPLE_PROVIDER).unwrap();
    let b = provider.query_interface(&IID_FRAGMENT_PROVIDER).unwrap();
    let c = provider.query_interface(&IID_INVOKE_PROVIDER).unwrap();
    assert_eq!(provider.ref_count(), 4);

    // Four releases bring it back to zero and free the object; the handler
    // drop is the observable free.
    assert_eq!(a.release(), 3);
    assert_eq!(b.release(), 2);
    assert_eq!(c.release(), 1);
    assert!(!dropped.load(Ordering::Acquire));
    drop(provider);
    assert!(dropped.load(Ordering::Acquire));
}

#[test]
fn concurrent_add_ref_release_pairs_leave_the_count_unchanged() {
    const THREADS: usize = 8;
    const PAIRS: usize = 1000;

    let (provider, _) = element_provider();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let provider = &provider;
            scope.spawn(move || {
                let handle = provider.query_interface(&IID_IUNKNOWN).unwrap();
                let raw = handle.as_ptr();
                for _ in 0..PAIRS {
                    // SAFETY: the handle keeps the provider alive across
                    // every pair.
                    unsafe {
                        unknown::add_ref(raw);
                        unknown::release(raw);
                    }
                }
            });
        }
    });

    assert_eq!(provider.ref_count(), 1);
}

#[test]
fn disconnect_mid_flight_is_safe_and_final() {
    const THREADS: usize = 6;

    let (provider, dropped) = element_provider();
    let hit_disconnected = Arc::new(AtomicBool::new(false));

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let provider = &provider;
            let hit_disconnected = hit_disconnected.clone();
            scope.spawn(move || {
                for _ in 0..500 {
                    match provider.query_interface(&IID_FRAGMENT_PROVIDER) {
                        Ok(handle) => drop(handle),
                        Err(UiaError::Disconnected) => {
                            hit_disconnected.store(true, Ordering::Relaxed);
                        }
                        Err(err) => panic!("unexpected negotiation error: {err}"),
                    }
                }
            });
        }
        // Disconnect while the negotiation threads are mid-flight.
        provider.disconnect().unwrap();
    });

    // Every reference drained; the object survived the race and is now
    // permanently disconnected.
    assert_eq!(provider.ref_count(), 1);
    assert!(provider.is_disconnected());
    assert_eq!(
        provider.query_interface(&IID_SIMPLE_PROVIDER).unwrap_err(),
        UiaError::Disconnected
    );
    assert!(!dropped.load(Ordering::Acquire));
}

#[test]
fn structure_change_with_empty_runtime_id_returns_a_status() {
    let (provider, _) = element_provider();

    // Degenerate payload, valid call: the boundary must answer with a
    // status either way.
    let outcome =
        events::raise_structure_changed(&provider, StructureChangeType::ChildrenInvalidated, &[]);
    if runtime().journal().is_some() {
        outcome.unwrap();
    }
}
