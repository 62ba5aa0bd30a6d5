//! Ownership layering between two entity kinds.
//!
//! [`Widget`] sits above [`Action`]: a widget may hold a strong reference
//! to an action, but an action must never hold a strong or weak reference
//! to any widget. The rule is a dependency direction, not a runtime check,
//! and the one way to break it silently is a registered callback whose
//! captured state owns a widget: that closes the cycle
//! widget → action → callback → widget and leaks both entities. A callback
//! that needs to reach back upward captures a [`WeakRef`] and resolves it
//! at invocation time; [`weak_callback`] packages that pattern.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::instrument;

use crate::weak::WeakRef;

/// Opaque callable state registered on an [`Action`].
pub type Callback = Box<dyn FnMut() + Send>;

/// Lower-layer entity: a named command carrying an opaque callback.
pub struct Action {
    name: RwLock<String>,
    callback: Mutex<Option<Callback>>,
}

impl Action {
    pub fn create() -> Arc<Self> {
        Arc::new(Self {
            name: RwLock::new(String::new()),
            callback: Mutex::new(None),
        })
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// Registers the callback run by [`invoke`](Action::invoke).
    ///
    /// The captured state is opaque to the action. Callers must not capture
    /// a strong reference to the widget that owns this action; capture a
    /// [`WeakRef`] and resolve it at call time instead, or use
    /// [`weak_callback`].
    pub fn set_callback(&self, callback: Callback) {
        *self.callback.lock() = Some(callback);
    }

    /// Runs the registered callback; no-op when none is set.
    #[instrument(level = "trace", skip(self))]
    pub fn invoke(&self) {
        // Run outside the lock so the callback may call back into this
        // action, e.g. to replace itself.
        let taken = self.callback.lock().take();
        if let Some(mut callback) = taken {
            callback();
            let mut slot = self.callback.lock();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name())
            .finish()
    }
}

/// Upper-layer entity that owns its action.
pub struct Widget {
    name: RwLock<String>,
    action: RwLock<Option<Arc<Action>>>,
}

impl Widget {
    pub fn create() -> Arc<Self> {
        Arc::new(Self {
            name: RwLock::new(String::new()),
            action: RwLock::new(None),
        })
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    /// Non-owning view of the current action; null when none is set.
    pub fn action(&self) -> WeakRef<Action> {
        match self.action.read().as_ref() {
            Some(action) => WeakRef::from(action),
            None => WeakRef::null(),
        }
    }

    /// Stores a strong reference: the widget keeps its action alive.
    pub fn set_action(&self, action: &Arc<Action>) {
        *self.action.write() = Some(action.clone());
    }

    /// Runs the current action's callback; no-op when no action is set.
    #[instrument(level = "trace", skip(self))]
    pub fn trigger_action(&self) {
        let action = self.action.read().clone();
        if let Some(action) = action {
            action.invoke();
        }
    }
}

impl fmt::Debug for Widget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Widget")
            .field("name", &self.name())
            .field("has_action", &self.action.read().is_some())
            .finish()
    }
}

/// Wraps a callback body so that it reaches its target through a weak
/// reference.
///
/// The returned callback resolves the target at every invocation and does
/// nothing once the target is gone. This is the sanctioned shape for a
/// callback registered on a lower-layer entity that needs to reach the
/// upper-layer entity owning it: the capture cannot extend the target's
/// lifetime, so no reference cycle can form.
pub fn weak_callback<T, F>(target: &Arc<T>, mut body: F) -> Callback
where
    T: Send + Sync + 'static,
    F: FnMut(&Arc<T>) + Send + 'static,
{
    let target = WeakRef::from(target);
    Box::new(move || {
        if let Some(strong) = target.resolve() {
            body(&strong);
        }
    })
}
