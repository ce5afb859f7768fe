use std::sync::{Arc, Mutex, PoisonError};

/// A lock a test can hand to the fake so appends to one observation list are serialized
/// with the test's own critical sections.
pub trait ExclusiveGuard: Send + Sync {
    fn run_exclusive(&self, critical: &mut dyn FnMut());
}

impl ExclusiveGuard for Mutex<()> {
    fn run_exclusive(&self, critical: &mut dyn FnMut()) {
        let _held = self.lock().unwrap_or_else(PoisonError::into_inner);
        critical();
    }
}

pub type SharedGuard = Arc<dyn ExclusiveGuard>;

pub fn new_guard() -> SharedGuard {
    Arc::new(Mutex::new(()))
}

/// Runs `critical` under `guard` when one is configured, otherwise runs it directly.
///
/// Panics if a guard implementation returns without running the section.
pub fn guarded<R>(guard: Option<&SharedGuard>, critical: impl FnOnce() -> R) -> R {
    let Some(guard) = guard else {
        return critical();
    };
    let mut critical = Some(critical);
    let mut result = None;
    guard.run_exclusive(&mut || {
        if let Some(critical) = critical.take() {
            result = Some(critical());
        }
    });
    result.expect("exclusive guard skipped the critical section")
}

#[cfg(test)]
mod tests {
    use super::{guarded, new_guard, ExclusiveGuard};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn runs_critical_section_without_guard() {
        let mut ran = 0;
        guarded(None, || ran += 1);
        assert_eq!(ran, 1);
    }

    #[test]
    fn runs_critical_section_exactly_once_under_guard() {
        let guard = new_guard();
        let mut ran = 0;
        guarded(Some(&guard), || ran += 1);
        assert_eq!(ran, 1);
    }

    #[test]
    fn guard_serializes_overlapping_sections() {
        let guard = new_guard();
        let inside = AtomicBool::new(false);
        let overlaps = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        guarded(Some(&guard), || {
                            if inside.swap(true, Ordering::SeqCst) {
                                overlaps.fetch_add(1, Ordering::SeqCst);
                            }
                            std::thread::yield_now();
                            inside.store(false, Ordering::SeqCst);
                        });
                    }
                });
            }
        });

        assert_eq!(overlaps.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn returns_the_critical_section_result() {
        let guard = new_guard();
        let owned = String::from("moved in");
        let out = guarded(Some(&guard), move || owned.len());
        assert_eq!(out, 8);
        assert_eq!(guarded(None, || "direct"), "direct");
    }

    struct SkippingGuard;

    impl ExclusiveGuard for SkippingGuard {
        fn run_exclusive(&self, _critical: &mut dyn FnMut()) {}
    }

    #[test]
    #[should_panic(expected = "skipped the critical section")]
    fn guard_that_skips_the_section_is_reported() {
        let guard: super::SharedGuard = std::sync::Arc::new(SkippingGuard);
        guarded(Some(&guard), || ());
    }

    #[test]
    fn poisoned_mutex_still_admits_callers() {
        let lock = Mutex::new(());
        let _ = std::panic::catch_unwind(|| {
            let _held = lock.lock();
            panic!("poison");
        });
        let mut ran = false;
        lock.run_exclusive(&mut || ran = true);
        assert!(ran);
    }
}
