// Collaborator interfaces for problem/test-case reads and submission writes.
// The production database lives outside this crate; the in-memory store backs
// the API binary, the CLI and the tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use anyhow::{Context, Result};
use arbiter_common::{Problem, SubmissionRecord, TestCase};
use serde::Deserialize;
use tracing::info;

/// Read side: problems and their curated test cases.
pub trait ContestStore: Send + Sync {
    fn problem(&self, id: i64) -> Result<Option<Problem>>;

    /// Curated cases the judging engine may consume for this problem, in
    /// stable ascending order. Visibility filtering is the store's concern.
    fn visible_test_cases(&self, problem_id: i64) -> Result<Vec<TestCase>>;
}

/// Write side: one record per judged submission.
pub trait SubmissionSink: Send + Sync {
    fn record_submission(&self, record: SubmissionRecord) -> Result<i64>;
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    problems: Vec<Problem>,
    #[serde(default)]
    test_cases: Vec<TestCase>,
}

#[derive(Default)]
struct MemoryStoreInner {
    problems: HashMap<i64, Problem>,
    test_cases: Vec<TestCase>,
    submissions: Vec<SubmissionRecord>,
}

/// In-memory store, seedable from a JSON file.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{problems: [...], test_cases: [...]}` from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let seed: SeedFile =
            serde_json::from_str(&content).context("Failed to parse problem seed file")?;

        let store = Self::new();
        {
            let mut inner = store.inner.write().unwrap();
            for problem in seed.problems {
                inner.problems.insert(problem.id, problem);
            }
            inner.test_cases = seed.test_cases;
        }
        info!(path = %path.display(), "Loaded problem store");
        Ok(store)
    }

    pub fn insert_problem(&self, problem: Problem) {
        self.inner
            .write()
            .unwrap()
            .problems
            .insert(problem.id, problem);
    }

    pub fn insert_test_case(&self, case: TestCase) {
        self.inner.write().unwrap().test_cases.push(case);
    }

    pub fn problem_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.inner.read().unwrap().problems.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.inner.read().unwrap().submissions.clone()
    }
}

impl ContestStore for MemoryStore {
    fn problem(&self, id: i64) -> Result<Option<Problem>> {
        Ok(self.inner.read().unwrap().problems.get(&id).cloned())
    }

    fn visible_test_cases(&self, problem_id: i64) -> Result<Vec<TestCase>> {
        // Insertion order stands in for the ascending-id order the real
        // database guarantees.
        Ok(self
            .inner
            .read()
            .unwrap()
            .test_cases
            .iter()
            .filter(|tc| tc.problem_id == problem_id)
            .cloned()
            .collect())
    }
}

impl SubmissionSink for MemoryStore {
    fn record_submission(&self, record: SubmissionRecord) -> Result<i64> {
        let mut inner = self.inner.write().unwrap();
        inner.submissions.push(record);
        Ok(inner.submissions.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbiter_common::VerdictStatus;
    use chrono::Utc;

    fn sample_problem(id: i64) -> Problem {
        Problem {
            id,
            title: "Sum of Two Numbers".to_string(),
            input_format: "Two integers".to_string(),
            output_format: "One integer".to_string(),
            constraints: "1 <= a, b <= 1000".to_string(),
            sample_input: "1 2".to_string(),
            sample_output: "3".to_string(),
            points: 100,
        }
    }

    #[test]
    fn problems_round_trip() {
        let store = MemoryStore::new();
        store.insert_problem(sample_problem(7));
        let found = store.problem(7).unwrap().unwrap();
        assert_eq!(found.title, "Sum of Two Numbers");
        assert!(store.problem(8).unwrap().is_none());
    }

    #[test]
    fn test_cases_filter_by_problem_and_keep_order() {
        let store = MemoryStore::new();
        for (pid, input) in [(1, "a"), (2, "b"), (1, "c")] {
            store.insert_test_case(TestCase {
                problem_id: pid,
                input: input.to_string(),
                expected_output: String::new(),
                is_visible: true,
            });
        }
        let cases = store.visible_test_cases(1).unwrap();
        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].input, "a");
        assert_eq!(cases[1].input, "c");
    }

    #[test]
    fn submissions_accumulate_with_ids() {
        let store = MemoryStore::new();
        let record = SubmissionRecord {
            user_id: Some(1),
            problem_id: 7,
            contest_id: None,
            code: "print(1)".to_string(),
            language: "python".to_string(),
            status: VerdictStatus::Accepted,
            test_cases_passed: 2,
            total_test_cases: 2,
            score: 100.0,
            submitted_at: Utc::now(),
        };
        let first = store.record_submission(record.clone()).unwrap();
        let second = store.record_submission(record).unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(store.submissions().len(), 2);
    }

    #[test]
    fn load_parses_seed_file() {
        let dir = std::env::temp_dir().join(format!("arbiter-store-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("problems.json");
        std::fs::write(
            &path,
            r#"{
              "problems": [
                {"id": 1, "title": "Reverse a String", "input_format": "A string", "points": 50}
              ],
              "test_cases": [
                {"problem_id": 1, "input": "abc", "expected_output": "cba"}
              ]
            }"#,
        )
        .unwrap();

        let store = MemoryStore::load(&path).unwrap();
        assert_eq!(store.problem(1).unwrap().unwrap().points, 50);
        assert_eq!(store.visible_test_cases(1).unwrap().len(), 1);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
