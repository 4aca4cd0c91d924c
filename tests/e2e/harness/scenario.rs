use super::assertions::Assertion;
use super::probe::{Journal, ProbeHelper, ScratchDirHelper};
use super::runner::ScenarioRunner;
use super::steps::ScenarioStep;
use rig_core::{BindingState, CompositeHelper, HelperDescriptor, HelperSet, LifecycleState};

/// Fluent DSL for building lifecycle scenarios
pub struct Scenario {
    name: String,
    helpers: HelperSet,
    journal: Journal,
    steps: Vec<ScenarioStep>,
}

impl Scenario {
    /// Create a new scenario with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            helpers: HelperSet::new(),
            journal: Journal::new(),
            steps: Vec::new(),
        }
    }

    /// Handle to the shared journal, for helpers built outside the DSL
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }

    // ===== Declarations =====

    /// Declare an order-recording probe helper
    pub fn with_probe(self, name: &str) -> Self {
        let probe = ProbeHelper::new(name, &self.journal);
        self.with_helper(name, probe)
    }

    /// Declare a probe whose journal label differs from its name, standing
    /// in for an override with new configuration
    pub fn with_probe_labeled(self, name: &str, label: &str) -> Self {
        let probe = ProbeHelper::new(label, &self.journal);
        self.with_helper(name, probe)
    }

    /// Declare a probe whose setup fails
    pub fn with_failing_setup(self, name: &str) -> Self {
        let probe = ProbeHelper::failing_setup(name, &self.journal);
        self.with_helper(name, probe)
    }

    /// Declare a probe whose teardown fails
    pub fn with_failing_teardown(self, name: &str) -> Self {
        let probe = ProbeHelper::failing_teardown(name, &self.journal);
        self.with_helper(name, probe)
    }

    /// Declare a tempdir-backed scratch directory helper
    pub fn with_scratch_dir(self, name: &str) -> Self {
        self.with_helper(name, ScratchDirHelper)
    }

    /// Declare a composite of probe children
    pub fn with_composite(self, name: &str, children: &[&str]) -> Self {
        let mut set = HelperSet::new();
        for child in children {
            set = set.with(child, ProbeHelper::new(child, &self.journal));
        }
        self.with_helper(name, CompositeHelper::new(set))
    }

    /// Declare an arbitrary helper
    pub fn with_helper(mut self, name: &str, descriptor: impl HelperDescriptor + 'static) -> Self {
        self.helpers = self.helpers.with(name, descriptor);
        self
    }

    // ===== Host framework actions =====

    /// Host calls begin() and expects it to succeed
    pub fn begin(mut self) -> Self {
        self.steps.push(ScenarioStep::Begin);
        self
    }

    /// Host calls begin() and expects setup to fail in `helper`
    pub fn begin_expecting_failure(mut self, helper: &str) -> Self {
        self.steps.push(ScenarioStep::BeginExpectingFailure {
            helper: helper.to_string(),
        });
        self
    }

    /// Host calls end() and expects it to succeed
    pub fn end(mut self) -> Self {
        self.steps.push(ScenarioStep::End);
        self
    }

    /// Host calls end() and expects teardown failures from exactly
    /// `helpers`, in declaration order
    pub fn end_expecting_failures(mut self, helpers: &[&str]) -> Self {
        self.steps.push(ScenarioStep::EndExpectingFailures {
            helpers: helpers.iter().map(|h| h.to_string()).collect(),
        });
        self
    }

    // ===== Test body actions =====

    /// Test body records an event into the journal
    pub fn body_records(mut self, event: &str) -> Self {
        self.steps.push(ScenarioStep::BodyRecords {
            event: event.to_string(),
        });
        self
    }

    /// Test body writes a file into a scratch dir helper
    pub fn touch_scratch(mut self, helper: &str, file: &str) -> Self {
        self.steps.push(ScenarioStep::TouchScratch {
            helper: helper.to_string(),
            file: file.to_string(),
        });
        self
    }

    // ===== Assertions =====

    /// Add a general assertion
    pub fn assert(mut self, assertion: Assertion) -> Self {
        self.steps.push(ScenarioStep::Assert { assertion });
        self
    }

    /// Assert the rig is in a specific lifecycle state
    pub fn assert_state(self, state: LifecycleState) -> Self {
        self.assert(Assertion::State(state))
    }

    /// Assert the journal holds exactly these events, in order
    pub fn assert_journal(self, events: &[&str]) -> Self {
        self.assert(Assertion::JournalEquals(
            events.iter().map(|e| e.to_string()).collect(),
        ))
    }

    /// Assert the journal contains an event
    pub fn assert_journal_contains(self, event: &str) -> Self {
        self.assert(Assertion::JournalContains(event.to_string()))
    }

    /// Assert a helper's binding state
    pub fn assert_helper_state(self, name: &str, state: BindingState) -> Self {
        self.assert(Assertion::HelperState {
            name: name.to_string(),
            state,
        })
    }

    /// Assert helper access is rejected as out of lifecycle
    pub fn assert_access_out_of_lifecycle(self, name: &str) -> Self {
        self.assert(Assertion::AccessOutOfLifecycle(name.to_string()))
    }

    /// Assert access by an undeclared name is rejected
    pub fn assert_unknown_helper(self, name: &str) -> Self {
        self.assert(Assertion::UnknownHelperRejected(name.to_string()))
    }

    /// Assert a file exists in a scratch dir helper
    pub fn assert_scratch_file(self, helper: &str, file: &str) -> Self {
        self.assert(Assertion::ScratchFileExists {
            helper: helper.to_string(),
            file: file.to_string(),
        })
    }

    // ===== Execution =====

    /// Execute the scenario and return results
    pub fn run(self) -> ScenarioResult {
        let mut runner = match ScenarioRunner::new(&self.helpers, self.journal.clone()) {
            Ok(r) => r,
            Err(e) => {
                return ScenarioResult {
                    name: self.name.clone(),
                    success: false,
                    steps_executed: 0,
                    failure_step: Some(0),
                    error: Some(format!("Failed to create runner: {}", e)),
                }
            }
        };

        match runner.execute(&self.steps) {
            Ok(()) => ScenarioResult {
                name: self.name,
                success: true,
                steps_executed: self.steps.len(),
                failure_step: None,
                error: None,
            },
            Err(e) => {
                let failure_step = runner.current_step();
                ScenarioResult {
                    name: self.name,
                    success: false,
                    steps_executed: failure_step,
                    failure_step: Some(failure_step),
                    error: Some(format!("{:?}", e)),
                }
            }
        }
    }
}

/// Result of running a scenario
#[derive(Debug)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub steps_executed: usize,
    pub failure_step: Option<usize>,
    pub error: Option<String>,
}

impl ScenarioResult {
    /// Unwrap the result, panicking if it failed
    pub fn unwrap(self) {
        if !self.success {
            panic!(
                "Scenario '{}' failed at step {}: {}",
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }

    /// Expect the result to be successful
    pub fn expect(self, msg: &str) {
        if !self.success {
            panic!(
                "{}: Scenario '{}' failed at step {}: {}",
                msg,
                self.name,
                self.failure_step.unwrap_or(0),
                self.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
    }
}
