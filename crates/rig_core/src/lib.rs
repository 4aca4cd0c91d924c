//! Rig Core Library
//!
//! A lifecycle-composition substrate for test fixtures, providing:
//! - Declarative helper descriptors bound once per test-case instance
//! - Deterministic declaration-order setup and reverse-order teardown
//! - Unwind-on-failure with a teardown ledger
//! - Structural composition of helpers from other helpers
//!
//! # Quick Start
//!
//! ```
//! use rig_core::{BoundHelper, HelperDescriptor, HelperError, HelperSet, TestRig};
//!
//! // A helper: the descriptor records configuration, the bound instance
//! // holds per-test state.
//! struct MessageCapture {
//!     target: &'static str,
//! }
//!
//! struct BoundCapture {
//!     target: &'static str,
//!     messages: Vec<String>,
//! }
//!
//! impl HelperDescriptor for MessageCapture {
//!     fn bind(&self) -> Box<dyn BoundHelper> {
//!         // Declaration-time configuration reaches the bound state unchanged.
//!         Box::new(BoundCapture {
//!             target: self.target,
//!             messages: Vec::new(),
//!         })
//!     }
//! }
//!
//! impl BoundHelper for BoundCapture {
//!     fn setup(&mut self) -> Result<(), HelperError> {
//!         Ok(())
//!     }
//!     fn teardown(&mut self) -> Result<(), HelperError> {
//!         self.messages.clear();
//!         Ok(())
//!     }
//! }
//!
//! // The host framework calls begin() before the test body and end() after.
//! let helpers = HelperSet::new().with("mail", MessageCapture { target: "outbox" });
//! let mut rig = TestRig::new(&helpers);
//!
//! rig.begin().unwrap();
//! rig.helper_mut::<BoundCapture>("mail").unwrap().messages.push("hi".into());
//! let capture = rig.helper::<BoundCapture>("mail").unwrap();
//! assert_eq!(capture.target, "outbox");
//! assert_eq!(capture.messages.len(), 1);
//! rig.end().unwrap();
//! ```
//!
//! # Features
//!
//! ## Ordering guarantees
//!
//! Setup runs in declaration order, teardown in exact reverse, so a helper
//! that depends on an earlier one is always torn down before its
//! dependency. A failed setup unwinds only the helpers that completed:
//!
//! ```
//! use rig_core::{HelperSet, LifecycleState, RigError, TestRig};
//! # use rig_core::{BoundHelper, HelperDescriptor, HelperError};
//! # struct Broken;
//! # struct BoundBroken;
//! # impl HelperDescriptor for Broken {
//! #     fn bind(&self) -> Box<dyn BoundHelper> { Box::new(BoundBroken) }
//! # }
//! # impl BoundHelper for BoundBroken {
//! #     fn setup(&mut self) -> Result<(), HelperError> { Err("boom".into()) }
//! #     fn teardown(&mut self) -> Result<(), HelperError> { Ok(()) }
//! # }
//!
//! let helpers = HelperSet::new().with("broken", Broken);
//! let mut rig = TestRig::new(&helpers);
//!
//! let err = rig.begin().unwrap_err();
//! assert!(matches!(err, RigError::SetupFailed { helper, .. } if helper == "broken"));
//! // Nothing is left half set up; a defensive end() is a no-op.
//! rig.end().unwrap();
//! assert_eq!(rig.state(), LifecycleState::Done);
//! ```
//!
//! ## Composition
//!
//! A [`CompositeHelper`] flattens a private set of child helpers into its
//! own setup/teardown; from the outer lifecycle it is indistinguishable
//! from a primitive helper. Custom composites embed [`NestedHelpers`] to
//! layer their own behavior around the children.

mod composite;
mod descriptor;
mod driver;
mod error;
mod registry;
mod rig;

pub use composite::{BoundComposite, CompositeHelper, NestedHelpers};
pub use descriptor::{AsAny, BoundHelper, HelperDescriptor};
pub use driver::{LifecycleDriver, LifecycleState};
pub use error::{HelperError, Result, RigError};
pub use registry::{BindingState, HelperSet, Registry};
pub use rig::{HelperReport, LifecycleReport, TestRig};
