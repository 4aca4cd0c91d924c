//! Lifecycle sequencing: forward setup, reverse teardown, unwind on failure.

use tracing::{debug, warn};

use crate::descriptor::BoundHelper;
use crate::error::{Result, RigError};
use crate::registry::{BindingState, Registry};

/// Driver states over one test's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// `begin` has not run.
    NotStarted,

    /// `begin` is walking the registry in declaration order.
    SettingUp,

    /// Every helper is set up; the test body may run.
    Ready,

    /// `end` is walking the ledger in reverse order.
    TearingDown,

    /// `end` completed, or there was nothing to do.
    Done,
}

/// Sequences helper setup and teardown over one [`Registry`].
///
/// The driver keeps the teardown ledger: the registry indices of every
/// helper whose setup completed, in setup order. The ledger drives both the
/// reverse-order teardown in [`end`](Self::end) and the unwind when a later
/// setup fails in [`begin`](Self::begin). A helper whose setup never
/// completed is never on the ledger and never gets a teardown call.
pub struct LifecycleDriver {
    state: LifecycleState,
    ledger: Vec<usize>,
}

impl LifecycleDriver {
    /// Creates a driver in the `NotStarted` state with an empty ledger.
    pub fn new() -> Self {
        Self {
            state: LifecycleState::NotStarted,
            ledger: Vec::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Binds and sets up every registered helper in declaration order.
    ///
    /// Each helper is appended to the ledger immediately after its setup
    /// returns, not before. If any setup fails, later helpers are not set
    /// up; the ledgered helpers are torn down in reverse order and the
    /// original error is returned as [`RigError::SetupFailed`]. The driver
    /// ends in `Ready` only on full success; after a failed begin it ends
    /// in `Done`, so a defensive `end` is a no-op.
    pub fn begin(&mut self, registry: &mut Registry) -> Result<()> {
        self.transition(LifecycleState::SettingUp)?;

        for idx in 0..registry.len() {
            let entry = registry.entry_mut(idx);
            entry.state = BindingState::SettingUp;
            let mut bound = entry.descriptor.bind();

            match bound.setup() {
                Ok(()) => {
                    entry.bound = Some(bound);
                    entry.state = BindingState::Ready;
                    self.ledger.push(idx);
                    debug!(helper = %entry.name, "helper set up");
                }
                Err(cause) => {
                    // Setup never completed, so this helper gets no
                    // teardown call; its bound state is simply dropped.
                    let failed = entry.name.clone();
                    entry.state = BindingState::TornDown;
                    drop(bound);

                    warn!(helper = %failed, error = %cause, "setup failed, unwinding");
                    self.unwind(registry);
                    self.transition(LifecycleState::Done)?;

                    return Err(RigError::SetupFailed {
                        helper: failed,
                        source: cause,
                    });
                }
            }
        }

        self.transition(LifecycleState::Ready)?;
        Ok(())
    }

    /// Tears down every ledgered helper in reverse declaration order.
    ///
    /// Teardown is never short-circuited: every ledger entry gets exactly
    /// one attempt, failures are collected, and the aggregate is returned
    /// as [`RigError::TeardownFailed`] once all attempts are done. Calling
    /// `end` when already `Done` is a no-op; so is calling it before
    /// `begin` (hosts invoke cleanup hooks defensively). From `SettingUp`,
    /// reachable only when a setup panicked through `begin`, exactly the
    /// ledgered helpers are torn down.
    pub fn end(&mut self, registry: &mut Registry) -> Result<()> {
        match self.state {
            LifecycleState::Done => return Ok(()),
            LifecycleState::NotStarted => {
                self.transition(LifecycleState::Done)?;
                return Ok(());
            }
            _ => {}
        }
        self.transition(LifecycleState::TearingDown)?;

        let mut failures = Vec::new();
        while let Some(idx) = self.ledger.pop() {
            let entry = registry.entry_mut(idx);
            if let Some(mut bound) = entry.bound.take() {
                match bound.teardown() {
                    Ok(()) => debug!(helper = %entry.name, "helper torn down"),
                    Err(cause) => {
                        warn!(helper = %entry.name, error = %cause, "teardown failed");
                        failures.push((entry.name.clone(), cause));
                    }
                }
            }
            entry.state = BindingState::TornDown;
        }

        // Release anything the ledger did not cover, e.g. an entry whose
        // setup panicked mid-begin. Its setup never completed, so it gets
        // no teardown call, only its state settled.
        for idx in 0..registry.len() {
            let entry = registry.entry_mut(idx);
            if entry.state != BindingState::Unbound {
                entry.bound = None;
                entry.state = BindingState::TornDown;
            }
        }

        self.transition(LifecycleState::Done)?;

        if failures.is_empty() {
            Ok(())
        } else {
            // Collected while walking the ledger backwards; report them in
            // declaration order.
            failures.reverse();
            Err(RigError::TeardownFailed { failures })
        }
    }

    /// Borrows the bound helper `name` as concrete type `T`.
    ///
    /// The driver is the lifecycle gate: outside `Ready` this returns
    /// [`RigError::OutOfLifecycle`] rather than stale or default state.
    pub fn helper<'r, T: BoundHelper>(&self, registry: &'r Registry, name: &str) -> Result<&'r T> {
        let idx = self.ready_index(registry, name)?;
        let bound = registry
            .entry(idx)
            .bound
            .as_deref()
            .ok_or_else(|| RigError::OutOfLifecycle(name.to_string()))?;

        bound
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| RigError::HelperTypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// Mutable variant of [`helper`](Self::helper).
    pub fn helper_mut<'r, T: BoundHelper>(
        &self,
        registry: &'r mut Registry,
        name: &str,
    ) -> Result<&'r mut T> {
        let idx = self.ready_index(registry, name)?;
        let bound = registry
            .entry_mut(idx)
            .bound
            .as_deref_mut()
            .ok_or_else(|| RigError::OutOfLifecycle(name.to_string()))?;

        bound
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or_else(|| RigError::HelperTypeMismatch {
                name: name.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    fn ready_index(&self, registry: &Registry, name: &str) -> Result<usize> {
        let idx = registry
            .index_of(name)
            .ok_or_else(|| RigError::UnknownHelper(name.to_string()))?;

        if self.state != LifecycleState::Ready {
            return Err(RigError::OutOfLifecycle(name.to_string()));
        }

        Ok(idx)
    }

    /// Best-effort reverse teardown of the ledger after a failed setup.
    ///
    /// Individual teardown failures here are logged and swallowed so they
    /// cannot mask the original setup error.
    fn unwind(&mut self, registry: &mut Registry) {
        while let Some(idx) = self.ledger.pop() {
            let entry = registry.entry_mut(idx);
            if let Some(mut bound) = entry.bound.take() {
                if let Err(cause) = bound.teardown() {
                    warn!(helper = %entry.name, error = %cause, "teardown failed during unwind");
                }
            }
            entry.state = BindingState::TornDown;
        }
    }

    /// Transitions driver state with validation.
    fn transition(&mut self, new_state: LifecycleState) -> Result<()> {
        if !self.is_valid_transition(new_state) {
            return Err(RigError::InvalidStateTransition {
                from: format!("{:?}", self.state),
                to: format!("{:?}", new_state),
            });
        }

        self.state = new_state;
        Ok(())
    }

    fn is_valid_transition(&self, new_state: LifecycleState) -> bool {
        use LifecycleState::*;

        matches!(
            (self.state, new_state),
            (NotStarted, SettingUp)
                | (NotStarted, Done)
                | (SettingUp, Ready)
                | (SettingUp, TearingDown)
                | (SettingUp, Done)
                | (Ready, TearingDown)
                | (TearingDown, Done)
        )
    }
}

impl Default for LifecycleDriver {
    fn default() -> Self {
        Self::new()
    }
}
