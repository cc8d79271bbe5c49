//! Maintenance step pipeline
//!
//! An ordered list of named steps, each producing exactly one result.
//! Isolation of failure is the core contract here: a failed step is
//! recorded and the pipeline moves on, so the report always holds one
//! entry per registered step, in execution order.

use tracing::info;

/// Outcome of one maintenance step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Success,
    PartialSuccess,
    Failed,
    Skipped,
    NotInstalled,
}

impl StepOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepOutcome::Success => "Success",
            StepOutcome::PartialSuccess => "Partial success",
            StepOutcome::Failed => "Failed",
            StepOutcome::Skipped => "Skipped",
            StepOutcome::NotInstalled => "Not installed",
        }
    }
}

/// Immutable record of one executed step
#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: String,
    pub outcome: StepOutcome,
    pub detail: String,
}

type StepFn<'a> = Box<dyn FnOnce() -> (StepOutcome, String) + 'a>;

/// Ordered pipeline of maintenance steps
#[derive(Default)]
pub struct Pipeline<'a> {
    steps: Vec<(String, StepFn<'a>)>,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Register a step; registration order is execution order
    pub fn add<F>(&mut self, name: &str, step: F)
    where
        F: FnOnce() -> (StepOutcome, String) + 'a,
    {
        self.steps.push((name.to_string(), Box::new(step)));
    }

    /// Run every step, regardless of earlier failures
    pub fn run(self) -> Vec<StepResult> {
        let mut results = Vec::with_capacity(self.steps.len());

        for (name, step) in self.steps {
            info!("step '{}' starting", name);
            let (outcome, detail) = step();
            info!("step '{}' finished: {} ({})", name, outcome.as_str(), detail);

            results.push(StepResult {
                name,
                outcome,
                detail,
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_steps_run_despite_failures() {
        let mut pipeline = Pipeline::new();
        pipeline.add("first", || (StepOutcome::Failed, "boom".to_string()));
        pipeline.add("second", || (StepOutcome::Success, String::new()));
        pipeline.add("third", || (StepOutcome::NotInstalled, String::new()));
        pipeline.add("fourth", || (StepOutcome::Skipped, String::new()));

        let results = pipeline.run();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].outcome, StepOutcome::Failed);
        assert_eq!(results[1].outcome, StepOutcome::Success);
        assert_eq!(results[2].outcome, StepOutcome::NotInstalled);
        assert_eq!(results[3].outcome, StepOutcome::Skipped);
    }

    #[test]
    fn test_results_preserve_registration_order() {
        let mut pipeline = Pipeline::new();
        for name in ["c", "a", "b"] {
            pipeline.add(name, || (StepOutcome::Success, String::new()));
        }

        let names: Vec<String> = pipeline.run().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_later_step_sees_side_effects_of_earlier() {
        use std::cell::Cell;
        let counter = Cell::new(0);

        let mut pipeline = Pipeline::new();
        pipeline.add("one", || {
            counter.set(counter.get() + 1);
            (StepOutcome::Failed, String::new())
        });
        pipeline.add("two", || {
            counter.set(counter.get() + 1);
            (StepOutcome::Success, String::new())
        });

        pipeline.run();
        assert_eq!(counter.get(), 2);
    }
}
