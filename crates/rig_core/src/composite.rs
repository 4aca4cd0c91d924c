//! Composite helpers: helpers built from other helpers.
//!
//! Composition is structural, not inherited. A composite owns a private
//! registry and driver over its child declarations, so the same ordering
//! and unwind rules apply one level down, scoped to the composite's own
//! bound instance. From the outer lifecycle's perspective a composite is
//! just another helper.

use crate::descriptor::{BoundHelper, HelperDescriptor};
use crate::driver::{LifecycleDriver, LifecycleState};
use crate::error::{HelperError, Result};
use crate::registry::{HelperSet, Registry};

/// Private registry + driver pair over a nested declaration set.
///
/// Embed one in a bound helper's state to flatten child helpers into that
/// helper's own setup/teardown without re-implementing sequencing: call
/// [`begin`](Self::begin) from the owning helper's `setup` before any
/// behavior that depends on the children, and [`end`](Self::end) from its
/// `teardown`.
pub struct NestedHelpers {
    registry: Registry,
    driver: LifecycleDriver,
}

impl NestedHelpers {
    /// Materializes entries for every child declaration.
    pub fn new(children: &HelperSet) -> Self {
        Self {
            registry: Registry::new(children),
            driver: LifecycleDriver::new(),
        }
    }

    /// Current nested lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.driver.state()
    }

    /// Sets up every child in declaration order, unwinding on failure.
    pub fn begin(&mut self) -> Result<()> {
        self.driver.begin(&mut self.registry)
    }

    /// Tears down every set-up child in reverse order, aggregating
    /// failures.
    pub fn end(&mut self) -> Result<()> {
        self.driver.end(&mut self.registry)
    }

    /// Borrows the bound child helper `name` as concrete type `T`.
    pub fn child<T: BoundHelper>(&self, name: &str) -> Result<&T> {
        self.driver.helper(&self.registry, name)
    }

    /// Mutable variant of [`child`](Self::child).
    pub fn child_mut<T: BoundHelper>(&mut self, name: &str) -> Result<&mut T> {
        self.driver.helper_mut(&mut self.registry, name)
    }
}

/// Helper descriptor assembled purely from nested helper declarations.
///
/// Its bound instance is set up only once every child is set up, and its
/// teardown tears every child down, so the outer lifecycle sees ordering
/// guarantees identical to a primitive helper's.
pub struct CompositeHelper {
    children: HelperSet,
}

impl CompositeHelper {
    /// Declares a composite over the given child set.
    pub fn new(children: HelperSet) -> Self {
        Self { children }
    }
}

impl HelperDescriptor for CompositeHelper {
    fn bind(&self) -> Box<dyn BoundHelper> {
        Box::new(BoundComposite {
            nested: NestedHelpers::new(&self.children),
        })
    }
}

/// Bound state of a [`CompositeHelper`].
pub struct BoundComposite {
    nested: NestedHelpers,
}

impl BoundComposite {
    /// Borrows a bound child helper.
    pub fn child<T: BoundHelper>(&self, name: &str) -> Result<&T> {
        self.nested.child(name)
    }

    /// Mutable variant of [`child`](Self::child).
    pub fn child_mut<T: BoundHelper>(&mut self, name: &str) -> Result<&mut T> {
        self.nested.child_mut(name)
    }
}

impl BoundHelper for BoundComposite {
    fn setup(&mut self) -> std::result::Result<(), HelperError> {
        self.nested.begin().map_err(Into::into)
    }

    fn teardown(&mut self) -> std::result::Result<(), HelperError> {
        self.nested.end().map_err(Into::into)
    }
}
