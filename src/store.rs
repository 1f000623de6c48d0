use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::action::Action;
use crate::model::{AppState, ValidationError};
use crate::reducer::reduce;

type Listener = dyn Fn(&AppState, &Action);
type ListenerList = RefCell<Vec<(u64, Rc<Listener>)>>;

/// Holds the current state and fans dispatched actions out to subscribers.
///
/// Dispatch is synchronous and immediate: the reducer runs to completion,
/// the state is swapped, then every subscriber is invoked before `dispatch`
/// returns. Re-entrant dispatch from inside a listener is supported — the
/// inner dispatch completes first, and the outer dispatch's remaining
/// listeners then observe the newer state. Guarding against infinite
/// dispatch recursion is the listener's responsibility.
///
/// All mutation of the state tree goes through `dispatch`; `get_state`
/// hands out shallow snapshot clones that share entities by `Arc`.
pub struct Store {
    state: RefCell<AppState>,
    listeners: Rc<ListenerList>,
    next_listener_id: Cell<u64>,
}

/// Handle returned by [`Store::subscribe`]. Calling `unsubscribe` removes
/// the listener; dropping the handle without calling it leaves the listener
/// registered for the life of the store.
pub struct Subscription {
    id: u64,
    listeners: Weak<ListenerList>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

impl Store {
    pub fn new(initial: AppState) -> Store {
        Store {
            state: RefCell::new(initial),
            listeners: Rc::new(RefCell::new(Vec::new())),
            next_listener_id: Cell::new(0),
        }
    }

    /// The current immutable snapshot.
    pub fn get_state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Register a listener invoked synchronously after every accepted
    /// dispatch with the new state and the action that produced it.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&AppState, &Action) + 'static,
    {
        let id = self.next_listener_id.get();
        self.next_listener_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    /// Run the action through the reducer and notify subscribers.
    ///
    /// A rejected action (entity validation failure) leaves the state
    /// untouched, is logged, and returns the error to the caller; no
    /// listener fires for it. Valid no-op actions still notify.
    pub fn dispatch(&self, action: Action) -> Result<(), ValidationError> {
        let next = {
            let state = self.state.borrow();
            reduce(&state, &action)
        };
        let next = match next {
            Ok(next) => next,
            Err(e) => {
                warn!(error = %e, "action rejected; state unchanged");
                return Err(e);
            }
        };
        *self.state.borrow_mut() = next;

        // Snapshot the listener list so subscribe/unsubscribe and re-entrant
        // dispatch inside a callback cannot invalidate the iteration. Each
        // listener sees the state current at its own invocation.
        let listeners: Vec<Rc<Listener>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            let snapshot = self.state.borrow().clone();
            listener(&snapshot, &action);
        }
        Ok(())
    }
}
