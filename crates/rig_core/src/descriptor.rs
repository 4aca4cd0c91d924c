//! Helper declaration and binding traits.
//!
//! A helper splits into two objects with different lifetimes: the
//! descriptor, a reusable declaration that lives as long as the test suite,
//! and the bound instance, per-test state that exists only between `begin`
//! and `end`. The core never looks inside either; it only sequences them.

use std::any::Any;

use crate::error::HelperError;

/// Reusable, declarative description of one unit of test setup/teardown.
///
/// Constructing a descriptor records configuration only (a target name, an
/// initial parameter) and has no side effects, so descriptors are safe to
/// build in declaration code that runs once per process and to share
/// between test-case instances. Whatever configuration the concrete type
/// carries is opaque to the core and reaches `bind`/`setup` unchanged.
pub trait HelperDescriptor: Send + Sync {
    /// Allocates the per-test state object.
    ///
    /// Called at most once per test-case instance. Allocation only: I/O and
    /// mutation of shared or global resources belong in
    /// [`BoundHelper::setup`].
    fn bind(&self) -> Box<dyn BoundHelper>;
}

/// Per-test realization of a [`HelperDescriptor`].
///
/// Owned exclusively by the registry entry that created it and never shared
/// across test-case instances. A bound instance reachable through the
/// access API has always completed its `setup`.
pub trait BoundHelper: AsAny {
    /// Performs the side-effecting initialization: installing a patch,
    /// opening a connection, starting a capture.
    fn setup(&mut self) -> std::result::Result<(), HelperError>;

    /// Reverses the effects of [`setup`](Self::setup).
    ///
    /// Must tolerate being called after a partially failed setup. Cleanup
    /// of resources that were already released is best effort: log and
    /// return `Ok` rather than fail the remaining teardown chain.
    fn teardown(&mut self) -> std::result::Result<(), HelperError>;
}

/// Upcast support so bound helpers can be downcast to their concrete type.
///
/// Implemented for every `'static` type; implementors of [`BoundHelper`]
/// get it for free.
pub trait AsAny: Any {
    /// The value as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// The value as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
