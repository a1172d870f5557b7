//! Payload-less "configuration changed" notifications
//!
//! Providers publish on a [`ChangeChannel`] whenever their backing data
//! changes; the coordinator and any interested callers subscribe to it.
//! The channel is injected explicitly into the coordinator and every
//! provider instead of being reached through global state.

use std::sync::{Arc, Mutex, Weak};

/// Callback invoked on every publication.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Publish/subscribe bus carrying a single, payload-less event.
///
/// Publishing is fire-and-forget. Each live listener sees a publication at
/// most once; nothing is queued for listeners that subscribe later.
pub trait ChangeChannel: Send + Sync {
    /// Notify every live listener that configuration changed.
    fn publish(&self);

    /// Attach a listener. It stays attached until the returned guard is
    /// dropped or cancelled.
    fn subscribe(&self, listener: Listener) -> ChannelSubscription;
}

/// Guard owning one listener attachment.
#[must_use = "dropping the subscription detaches the listener immediately"]
pub struct ChannelSubscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl ChannelSubscription {
    /// Create a guard that runs `detach` exactly once when released.
    pub fn new(detach: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Detach the listener now.
    pub fn cancel(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for ChannelSubscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ChannelSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSubscription")
            .field("active", &self.detach.is_some())
            .finish()
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// In-process [`ChangeChannel`].
///
/// Cloning yields another handle onto the same bus.
#[derive(Clone, Default)]
pub struct LocalChangeChannel {
    listeners: Arc<Mutex<Listeners>>,
}

impl LocalChangeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor returning the channel behind a trait object.
    pub fn shared() -> Arc<dyn ChangeChannel> {
        Arc::new(Self::new())
    }

    /// Number of currently attached listeners.
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).entries.len()
    }
}

impl ChangeChannel for LocalChangeChannel {
    fn publish(&self) {
        // Snapshot so listeners may attach or detach while being notified.
        let snapshot: Vec<Listener> = lock(&self.listeners)
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        tracing::trace!(listeners = snapshot.len(), "Publishing configuration change");
        for listener in snapshot {
            listener();
        }
    }

    fn subscribe(&self, listener: Listener) -> ChannelSubscription {
        let id = {
            let mut listeners = lock(&self.listeners);
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.push((id, listener));
            id
        };

        let weak: Weak<Mutex<Listeners>> = Arc::downgrade(&self.listeners);
        ChannelSubscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                lock(&listeners).entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }
}

impl std::fmt::Debug for LocalChangeChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalChangeChannel")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn lock(listeners: &Mutex<Listeners>) -> std::sync::MutexGuard<'_, Listeners> {
    listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
