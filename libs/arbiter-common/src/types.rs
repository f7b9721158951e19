use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall outcome of judging one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictStatus {
    Accepted,
    WrongAnswer,
    CompilationError,
    RuntimeError,
    ToolchainUnavailable,
    InternalError,
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerdictStatus::Accepted => "accepted",
            VerdictStatus::WrongAnswer => "wrong_answer",
            VerdictStatus::CompilationError => "compilation_error",
            VerdictStatus::RuntimeError => "runtime_error",
            VerdictStatus::ToolchainUnavailable => "toolchain_unavailable",
            VerdictStatus::InternalError => "internal_error",
        };
        write!(f, "{}", s)
    }
}

/// Problem metadata as authored by an administrator. Read-only to the engine;
/// also feeds the heuristic test case generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub input_format: String,
    #[serde(default)]
    pub output_format: String,
    #[serde(default)]
    pub constraints: String,
    #[serde(default)]
    pub sample_input: String,
    #[serde(default)]
    pub sample_output: String,
    #[serde(default = "default_points")]
    pub points: u32,
}

fn default_points() -> u32 {
    100
}

/// A curated test case stored for a problem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub problem_id: i64,
    pub input: String,
    pub expected_output: String,
    #[serde(default = "default_visible")]
    pub is_visible: bool,
}

fn default_visible() -> bool {
    true
}

/// One (input, expected output) pair as consumed by the judging loop.
/// Curated, generated and override cases all reduce to this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCasePair {
    pub input: String,
    pub expected_output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeRequest {
    pub code: String,
    pub language: String,
    pub problem_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub contest_id: Option<i64>,
    #[serde(default)]
    pub custom_input: Option<String>,
    #[serde(default)]
    pub test_cases_override: Option<Vec<TestCasePair>>,
}

/// Per-case judging outcome. `expected`/`actual` are populated only when the
/// case failed, so a passing verdict never echoes test data back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub index: usize,
    pub passed: bool,
    #[serde(rename = "time")]
    pub time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
    pub input: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionVerdict {
    pub overall_status: VerdictStatus,
    pub test_cases: Vec<TestCaseResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmissionVerdict {
    pub fn passed_count(&self) -> usize {
        self.test_cases.iter().filter(|c| c.passed).count()
    }
}

/// Output of a custom-input run (no grading).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub output: String,
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
}

/// What gets handed to the submission store after aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub user_id: Option<i64>,
    pub problem_id: i64,
    pub contest_id: Option<i64>,
    pub code: String,
    pub language: String,
    pub status: VerdictStatus,
    pub test_cases_passed: usize,
    pub total_test_cases: usize,
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
}
