//! Run report and exit status.

use std::fmt;
use std::process::ExitCode;

use crate::scenario::Scenario;

/// How one scenario ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    Passed,
    /// Timeout or fatal assertion; the run continued.
    Failed(String),
    /// Protocol violation or transport failure; the run stopped here.
    Aborted(String),
    /// Not run because an earlier scenario aborted the run.
    Skipped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioOutcome {
    pub scenario: Scenario,
    pub status: Status,
    /// Expectations that failed without failing the scenario.
    pub advisory_failures: usize,
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            Status::Passed => write!(f, "  PASS  {}", self.scenario)?,
            Status::Failed(reason) => write!(f, "  FAIL  {}: {}", self.scenario, reason)?,
            Status::Aborted(reason) => write!(f, "  ABORT {}: {}", self.scenario, reason)?,
            Status::Skipped => write!(f, "  SKIP  {}", self.scenario)?,
        }
        if self.advisory_failures > 0 {
            write!(f, " ({} advisory failures)", self.advisory_failures)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Report {
    outcomes: Vec<ScenarioOutcome>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    pub fn outcome(&self, scenario: Scenario) -> Option<&ScenarioOutcome> {
        self.outcomes.iter().find(|o| o.scenario == scenario)
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn passed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.status == Status::Passed)
            .count()
    }

    pub fn aborted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|o| matches!(o.status, Status::Aborted(_)))
    }

    pub fn advisory_failures(&self) -> usize {
        self.outcomes.iter().map(|o| o.advisory_failures).sum()
    }

    /// Every scenario passed. Advisory failures do not count.
    pub fn success(&self) -> bool {
        self.passed() == self.total()
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// Print one line per scenario and a total.
    pub fn print_summary(&self) {
        println!("=== OCCI Conformance ===");
        for outcome in &self.outcomes {
            println!("{}", outcome);
        }
        println!("\n{}/{} passed", self.passed(), self.total());
    }
}
