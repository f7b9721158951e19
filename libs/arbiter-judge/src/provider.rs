// Test case provider: decides which (input, expected output) pairs a judging
// call evaluates, and where they come from.

use anyhow::Result;
use arbiter_common::{Problem, TestCasePair};
use tracing::{debug, warn};

use crate::generator;
use crate::store::ContestStore;

/// Where the evaluated cases came from. One call draws from exactly one
/// source; curated and generated cases are never mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseOrigin {
    Override,
    Curated,
    Generated,
}

/// Resolve the ordered case list for a judging call.
///
/// Priority: an explicit override from the request, then curated store cases
/// (already visibility-filtered and ordered by the store), then the heuristic
/// generator as a last resort.
pub fn resolve(
    problem: &Problem,
    override_cases: Option<&[TestCasePair]>,
    store: &dyn ContestStore,
) -> Result<(Vec<TestCasePair>, CaseOrigin)> {
    if let Some(cases) = override_cases {
        if !cases.is_empty() {
            debug!(problem_id = problem.id, count = cases.len(), "Using override test cases");
            return Ok((cases.to_vec(), CaseOrigin::Override));
        }
    }

    let curated = store.visible_test_cases(problem.id)?;
    if !curated.is_empty() {
        debug!(problem_id = problem.id, count = curated.len(), "Using curated test cases");
        let pairs = curated
            .into_iter()
            .map(|tc| TestCasePair {
                input: tc.input,
                expected_output: tc.expected_output,
            })
            .collect();
        return Ok((pairs, CaseOrigin::Curated));
    }

    let generated = generator::generate(problem);
    if generated.is_empty() {
        warn!(problem_id = problem.id, "No curated test cases and the generator produced none");
    } else {
        debug!(problem_id = problem.id, count = generated.len(), "Using generated test cases");
    }
    Ok((generated, CaseOrigin::Generated))
}
