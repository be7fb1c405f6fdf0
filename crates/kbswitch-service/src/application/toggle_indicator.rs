//! IndicatorControl: shows and hides the on-screen layout indicator.
//!
//! The indicator is an external collaborator. It registers itself when it
//! starts and unregisters when it stops; while nothing is registered the
//! toggle command has nothing to act on and reports failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// The on-screen indicator as seen by the service.
#[cfg_attr(test, mockall::automock)]
pub trait Indicator: Send + Sync {
    fn is_visible(&self) -> bool;
    fn show(&self);
    fn hide(&self);
}

/// Registration slot for the indicator plus the "indicator enabled" setting.
#[derive(Default)]
pub struct IndicatorControl {
    indicator: Mutex<Option<Arc<dyn Indicator>>>,
    enabled: AtomicBool,
}

impl IndicatorControl {
    pub fn new(enabled: bool) -> Self {
        Self {
            indicator: Mutex::new(None),
            enabled: AtomicBool::new(enabled),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn Indicator>>> {
        self.indicator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers the running indicator, replacing any previous one.
    pub fn register(&self, indicator: Arc<dyn Indicator>) {
        *self.lock() = Some(indicator);
        debug!("indicator registered");
    }

    pub fn unregister(&self) {
        *self.lock() = None;
        debug!("indicator unregistered");
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Hides a visible indicator, otherwise shows it if showing is enabled.
    ///
    /// Returns `false` only when no indicator is registered.
    pub fn toggle(&self) -> bool {
        // Clone out so the indicator is called without holding the lock.
        let Some(indicator) = self.lock().clone() else {
            debug!("toggle requested with no indicator registered");
            return false;
        };

        if indicator.is_visible() {
            indicator.hide();
        } else if self.is_enabled() {
            indicator.show();
        } else {
            debug!("indicator is disabled; not showing it");
        }
        true
    }
}
