//! Test rig handle providing the main lifecycle API.

use tracing::debug;

use crate::descriptor::BoundHelper;
use crate::driver::{LifecycleDriver, LifecycleState};
use crate::error::Result;
use crate::registry::{BindingState, HelperSet, Registry};

/// Per-test-case-instance handle over a set of declared helpers.
///
/// The host framework makes exactly two calls per test:
/// [`begin`](Self::begin) before the test body and [`end`](Self::end) after
/// it, success or failure. In between, the body reaches bound helpers
/// through [`helper`](Self::helper) and [`helper_mut`](Self::helper_mut).
///
/// Each rig owns its registry and driver outright, so parallel test-case
/// instances built from the same [`HelperSet`] share nothing but the
/// immutable descriptors.
pub struct TestRig {
    /// Identifier included in log events to correlate parallel instances.
    rig_id: String,
    registry: Registry,
    driver: LifecycleDriver,
}

impl TestRig {
    /// Creates a rig for one test-case instance from a declaration set.
    ///
    /// Entries for every declared helper are materialized now; binding and
    /// setup are deferred to [`begin`](Self::begin).
    pub fn new(helpers: &HelperSet) -> Self {
        Self {
            rig_id: uuid::Uuid::new_v4().to_string(),
            registry: Registry::new(helpers),
            driver: LifecycleDriver::new(),
        }
    }

    /// Identifier for correlating this rig's log events.
    pub fn rig_id(&self) -> &str {
        &self.rig_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.driver.state()
    }

    /// Binds and sets up every declared helper in declaration order.
    ///
    /// On failure the already-set-up helpers are torn down in reverse
    /// order before [`crate::RigError::SetupFailed`] is returned; the test
    /// body must not run in that case.
    pub fn begin(&mut self) -> Result<()> {
        debug!(rig_id = %self.rig_id, helpers = self.registry.len(), "lifecycle begin");
        self.driver.begin(&mut self.registry)
    }

    /// Tears down every set-up helper in reverse declaration order.
    ///
    /// Never short-circuits: each helper gets exactly one teardown attempt
    /// and all failures come back aggregated in
    /// [`crate::RigError::TeardownFailed`]. Calling `end` again once done
    /// is a no-op. When the test body itself failed, report a teardown
    /// error in addition to the body's failure, never instead of it.
    pub fn end(&mut self) -> Result<()> {
        debug!(rig_id = %self.rig_id, "lifecycle end");
        self.driver.end(&mut self.registry)
    }

    /// Borrows the bound helper `name` as concrete type `T`.
    ///
    /// Available only while the rig is ready: before `begin`, after `end`,
    /// or mid-transition this returns [`crate::RigError::OutOfLifecycle`].
    pub fn helper<T: BoundHelper>(&self, name: &str) -> Result<&T> {
        self.driver.helper(&self.registry, name)
    }

    /// Mutable variant of [`helper`](Self::helper).
    pub fn helper_mut<T: BoundHelper>(&mut self, name: &str) -> Result<&mut T> {
        self.driver.helper_mut(&mut self.registry, name)
    }

    /// Binding state of `name`, if declared.
    pub fn binding_state(&self, name: &str) -> Option<BindingState> {
        self.registry.state(name)
    }

    /// Snapshot of the current lifecycle and per-helper binding states.
    pub fn report(&self) -> LifecycleReport {
        LifecycleReport {
            state: self.driver.state(),
            helpers: self
                .registry
                .states()
                .map(|(name, state)| HelperReport {
                    name: name.to_string(),
                    state,
                })
                .collect(),
        }
    }
}

/// Snapshot of one rig's lifecycle for diagnostics.
#[derive(Debug, Clone)]
pub struct LifecycleReport {
    /// Driver state at the time of the snapshot.
    pub state: LifecycleState,
    /// Per-helper binding states, in declaration order.
    pub helpers: Vec<HelperReport>,
}

/// Per-helper entry in a [`LifecycleReport`].
#[derive(Debug, Clone)]
pub struct HelperReport {
    /// Declared helper name.
    pub name: String,
    /// Current binding state.
    pub state: BindingState,
}
