//! Layout change notification.
//!
//! Every resolved layout is published on the `layout_changed` channel. Any
//! number of listeners (the indicator, the binary's logger, tests) subscribe
//! with [`LayoutNotifier::subscribe`]. Publishing never blocks; a listener
//! that falls behind by more than the channel capacity skips the oldest
//! notifications.

use tokio::sync::broadcast;
use tracing::trace;

use crate::application::switch_layout::LayoutBroadcaster;

/// Name of the layout change channel.
pub const LAYOUT_CHANGED_CHANNEL: &str = "layout_changed";

const CHANNEL_CAPACITY: usize = 64;

/// Payload of a layout change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutChanged {
    /// Always [`LAYOUT_CHANGED_CHANNEL`].
    pub channel: &'static str,
    /// Name of the layout that is now current.
    pub layout: String,
}

impl LayoutChanged {
    pub fn new(layout: impl Into<String>) -> Self {
        Self {
            channel: LAYOUT_CHANGED_CHANNEL,
            layout: layout.into(),
        }
    }
}

/// Broadcast-backed publisher for [`LayoutChanged`].
#[derive(Debug, Clone)]
pub struct LayoutNotifier {
    tx: broadcast::Sender<LayoutChanged>,
}

impl Default for LayoutNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LayoutChanged> {
        self.tx.subscribe()
    }
}

impl LayoutBroadcaster for LayoutNotifier {
    fn announce(&self, layout: &str) {
        if self.tx.send(LayoutChanged::new(layout)).is_err() {
            trace!(layout, "layout change with no listeners");
        }
    }
}
