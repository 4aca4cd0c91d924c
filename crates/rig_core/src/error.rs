//! Error types for rig_core operations.

use thiserror::Error;

/// Boxed cause type for failures raised inside a helper's own
/// `setup`/`teardown` code.
///
/// Helper-domain errors stay whatever type the helper chose; the core only
/// carries them as the source of [`RigError::SetupFailed`] and
/// [`RigError::TeardownFailed`].
pub type HelperError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for rig_core operations.
#[derive(Error, Debug)]
pub enum RigError {
    /// Helper state accessed before `begin` or after `end`.
    #[error("helper '{0}' accessed outside its lifecycle window")]
    OutOfLifecycle(String),

    /// No helper declared under the given name.
    #[error("no helper declared with name '{0}'")]
    UnknownHelper(String),

    /// Bound helper exists but has a different concrete type.
    #[error("helper '{name}' is not a '{expected}'")]
    HelperTypeMismatch {
        /// Declared helper name
        name: String,
        /// Concrete type requested by the caller
        expected: &'static str,
    },

    /// Two unrelated declaration sets both declare the same name.
    #[error("duplicate helper name '{0}' when merging declaration sets")]
    DuplicateHelper(String),

    /// A helper's setup failed during `begin`.
    ///
    /// Helpers set up before the failure have already been torn down in
    /// reverse order by the time this is returned.
    #[error("setup failed for helper '{helper}'")]
    SetupFailed {
        /// Name of the helper whose setup raised
        helper: String,
        /// The original setup error
        #[source]
        source: HelperError,
    },

    /// One or more helpers failed to tear down during `end`.
    ///
    /// Every set-up helper got exactly one teardown attempt; the failures
    /// are listed in declaration order.
    #[error("teardown failed for {} helper(s)", failures.len())]
    TeardownFailed {
        /// (helper name, cause) for every failed teardown
        failures: Vec<(String, HelperError)>,
    },

    /// Invalid lifecycle state transition.
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidStateTransition {
        /// Source state
        from: String,
        /// Target state
        to: String,
    },
}

impl RigError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::OutOfLifecycle(_) => {
                Some("Access helpers only between begin() and end(). Check that the host framework calls begin() before the test body.")
            }
            Self::UnknownHelper(_) => {
                Some("Declare the helper on the rig's HelperSet, and check the name for typos.")
            }
            Self::HelperTypeMismatch { .. } => {
                Some("Request the bound type produced by this helper's bind(), not the descriptor type.")
            }
            Self::DuplicateHelper(_) => {
                Some("Rename one of the colliding helpers, or use declare() on the target set if an override is intended.")
            }
            Self::SetupFailed { .. } => {
                Some("Earlier helpers were already unwound; fix the failing helper's setup and rerun the test.")
            }
            Self::InvalidStateTransition { .. } => {
                Some("Call begin() exactly once per test, before the body; end() may be repeated safely.")
            }
            _ => None,
        }
    }
}

/// Convenience Result type for rig_core operations.
pub type Result<T> = std::result::Result<T, RigError>;
