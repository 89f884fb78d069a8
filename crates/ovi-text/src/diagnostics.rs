//! Injected diagnostics capability.
//!
//! Components never log through a process-wide subscriber. Each one is
//! handed a [`Diagnostics`] at construction and emits its `tracing` events
//! inside [`Diagnostics::in_scope`], which routes them to the wrapped
//! dispatcher for the duration of the call only.

use tracing::Dispatch;

#[derive(Clone, Debug)]
pub struct Diagnostics {
    dispatch: Dispatch,
}

impl Diagnostics {
    /// Route events to `dispatch`.
    #[must_use]
    pub const fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Drop every event.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            dispatch: Dispatch::none(),
        }
    }

    /// Run `f` with this capability as the current dispatcher.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::disabled()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
