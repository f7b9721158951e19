//! Judging engine orchestration.
//!
//! One `judge` call is one synchronous pipeline: resolve toolchain, probe it,
//! load the problem, acquire a workspace, compile if the language requires
//! it, then run and compare each test case in provider order and aggregate
//! the verdict. The engine owns sequencing and failure classification; the
//! leaf modules own the mechanics.
//!
//! Boundary rules:
//! - The toolchain probe runs before any file is written, so a missing
//!   compiler never leaves a workspace behind.
//! - Execution stops at the first runtime error; later cases are never
//!   attempted.
//! - Grading outcomes (accepted, wrong_answer, compilation_error,
//!   runtime_error) are persisted; engine-level failures abort before a
//!   verdict exists and skip persistence.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use arbiter_common::{
    JudgeRequest, Problem, RunOutput, SubmissionRecord, SubmissionVerdict,
};
use chrono::Utc;
use regex::Regex;
use tracing::{error, info, warn};

use crate::error::JudgeError;
use crate::evaluator::{self, CaseExecution};
use crate::provider;
use crate::runner;
use crate::store::{ContestStore, SubmissionSink};
use crate::toolchain::{ToolchainRegistry, ToolchainSpec};
use crate::workspace::Workspace;

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Parent directory for per-call workspaces.
    pub workspace_root: PathBuf,
    /// Wall-clock budget per test case execution.
    pub time_limit: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workspace_root: std::env::temp_dir(),
            time_limit: Duration::from_millis(5000),
        }
    }
}

pub struct JudgeEngine {
    registry: Arc<ToolchainRegistry>,
    config: EngineConfig,
}

impl JudgeEngine {
    pub fn new(registry: Arc<ToolchainRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ToolchainRegistry {
        &self.registry
    }

    /// Resolve and probe the toolchain. Runs before any filesystem work.
    async fn resolve_toolchain(&self, language: &str) -> Result<&ToolchainSpec, JudgeError> {
        let spec = self
            .registry
            .resolve(language)
            .ok_or_else(|| JudgeError::UnsupportedLanguage(language.to_string()))?;

        if let Err(reason) = self.registry.probe(spec).await {
            warn!(language, reason = %reason, "Toolchain unavailable");
            return Err(JudgeError::ToolchainUnavailable {
                language: language.to_string(),
                hint: spec.install_hint.clone(),
                reason,
            });
        }
        Ok(spec)
    }

    /// Judge one submission against its problem's test cases.
    pub async fn judge(
        &self,
        request: &JudgeRequest,
        store: &dyn ContestStore,
        sink: &dyn SubmissionSink,
    ) -> Result<SubmissionVerdict, JudgeError> {
        info!(
            problem_id = request.problem_id,
            language = %request.language,
            source_size = request.code.len(),
            "Judging submission"
        );

        let spec = self.resolve_toolchain(&request.language).await?;

        let problem = store
            .problem(request.problem_id)
            .map_err(JudgeError::Internal)?
            .ok_or(JudgeError::ProblemNotFound(request.problem_id))?;

        let (cases, origin) = provider::resolve(
            &problem,
            request.test_cases_override.as_deref(),
            store,
        )
        .map_err(JudgeError::Internal)?;

        if cases.is_empty() {
            return Err(JudgeError::Internal(anyhow::anyhow!(
                "No test cases could be resolved for problem {}",
                problem.id
            )));
        }
        info!(cases = cases.len(), origin = ?origin, "Resolved test cases");

        let mut workspace = Workspace::create(&self.config.workspace_root, spec)
            .map_err(JudgeError::Workspace)?;
        workspace
            .write_source(&prepare_source(&request.code, spec))
            .map_err(JudgeError::Workspace)?;

        let compiled = runner::compile(&workspace, spec).await?;
        if !compiled.ok {
            info!(language = %request.language, "Compilation failed");
            let verdict = evaluator::compilation_failure(&compiled.stderr);
            self.persist(request, &problem, &verdict, sink);
            workspace.release();
            return Ok(verdict);
        }

        let mut executions: Vec<CaseExecution> = Vec::with_capacity(cases.len());
        for (idx, case) in cases.iter().enumerate() {
            workspace
                .write_input(&case.input)
                .map_err(JudgeError::Workspace)?;

            let outcome = runner::run(&workspace, spec, self.config.time_limit).await?;
            let failed = !outcome.success();

            executions.push(CaseExecution {
                index: idx + 1,
                input: case.input.clone(),
                expected_output: case.expected_output.clone(),
                stdout: workspace.read_output(),
                stderr: workspace.read_errors(),
                duration_ms: outcome.duration_ms,
                runtime_error: failed && !outcome.timed_out,
                timed_out: outcome.timed_out,
            });

            // First runtime error ends the call; remaining cases never run.
            if failed {
                warn!(case = idx + 1, total = cases.len(), "Run failed, skipping remaining cases");
                break;
            }
        }

        let verdict = evaluator::aggregate(&executions);
        info!(
            status = %verdict.overall_status,
            passed = verdict.passed_count(),
            total = verdict.test_cases.len(),
            "Judging complete"
        );

        self.persist(request, &problem, &verdict, sink);
        workspace.release();
        Ok(verdict)
    }

    /// Compile-and-run with caller-supplied input, no grading and no
    /// persistence. Compilation and runtime failures surface as errors
    /// carrying the captured stderr.
    pub async fn run_custom(
        &self,
        code: &str,
        language: &str,
        input: &str,
    ) -> Result<RunOutput, JudgeError> {
        let spec = self.resolve_toolchain(language).await?;

        let mut workspace = Workspace::create(&self.config.workspace_root, spec)
            .map_err(JudgeError::Workspace)?;
        workspace
            .write_source(&prepare_source(code, spec))
            .map_err(JudgeError::Workspace)?;
        workspace.write_input(input).map_err(JudgeError::Workspace)?;

        let compiled = runner::compile(&workspace, spec).await?;
        if !compiled.ok {
            workspace.release();
            return Err(JudgeError::Compilation(compiled.stderr.trim().to_string()));
        }

        let outcome = runner::run(&workspace, spec, self.config.time_limit).await?;
        if outcome.timed_out {
            workspace.release();
            return Err(JudgeError::Runtime(format!(
                "Time limit exceeded after {} ms",
                self.config.time_limit.as_millis()
            )));
        }
        if !outcome.success() {
            let stderr = workspace.read_errors().trim().to_string();
            workspace.release();
            return Err(JudgeError::Runtime(stderr));
        }

        let output = RunOutput {
            output: workspace.read_output(),
            execution_time_ms: outcome.duration_ms,
        };
        workspace.release();
        Ok(output)
    }

    /// Persistence failure is logged and swallowed; the verdict already
    /// produced must reach the caller unchanged.
    fn persist(
        &self,
        request: &JudgeRequest,
        problem: &Problem,
        verdict: &SubmissionVerdict,
        sink: &dyn SubmissionSink,
    ) {
        let passed = verdict.passed_count();
        let total = verdict.test_cases.len();
        let record = SubmissionRecord {
            user_id: request.user_id,
            problem_id: problem.id,
            contest_id: request.contest_id,
            code: request.code.clone(),
            language: request.language.clone(),
            status: verdict.overall_status,
            test_cases_passed: passed,
            total_test_cases: total,
            score: evaluator::score(passed, total, problem.points),
            submitted_at: Utc::now(),
        };

        match sink.record_submission(record) {
            Ok(id) => info!(submission_id = id, "Submission recorded"),
            Err(e) => error!(error = %e, "Failed to record submission"),
        }
    }
}

/// Java sources must declare `public class Solution` to match the configured
/// source filename; submissions using another class name are rewritten.
fn prepare_source(code: &str, spec: &ToolchainSpec) -> String {
    let Some(main_class) = &spec.main_class else {
        return code.to_string();
    };

    static CLASS_RE: OnceLock<Regex> = OnceLock::new();
    let re = CLASS_RE.get_or_init(|| Regex::new(r"public\s+class\s+([A-Za-z0-9_]+)").unwrap());

    if let Some(caps) = re.captures(code) {
        if &caps[1] != main_class.as_str() {
            return re
                .replace(code, format!("public class {}", main_class).as_str())
                .into_owned();
        }
    }
    code.to_string()
}
