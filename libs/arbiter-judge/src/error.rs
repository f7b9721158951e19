use arbiter_common::VerdictStatus;
use thiserror::Error;

/// Engine-level failures. These abort the judging call before a verdict
/// exists and are never persisted as submissions.
///
/// `Compilation` and `Runtime` only surface from the custom-input run path;
/// during graded judging the same conditions become verdicts
/// (`compilation_error` / `runtime_error`) and are persisted.
#[derive(Debug, Error)]
pub enum JudgeError {
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("{hint} ({reason})")]
    ToolchainUnavailable {
        language: String,
        hint: String,
        reason: String,
    },

    #[error("Problem not found: {0}")]
    ProblemNotFound(i64),

    #[error("Compilation Error: {0}")]
    Compilation(String),

    #[error("Runtime Error: {0}")]
    Runtime(String),

    #[error("Failed to prepare execution workspace: {0}")]
    Workspace(#[source] std::io::Error),

    #[error("Internal judging error: {0}")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for JudgeError {
    fn from(e: anyhow::Error) -> Self {
        JudgeError::Internal(e)
    }
}

impl JudgeError {
    /// The status this failure maps to in the verdict taxonomy. Used for
    /// logging; the caller-facing response for these is `{error}`, not a
    /// verdict.
    pub fn status(&self) -> VerdictStatus {
        match self {
            JudgeError::ToolchainUnavailable { .. } => VerdictStatus::ToolchainUnavailable,
            JudgeError::Compilation(_) => VerdictStatus::CompilationError,
            JudgeError::Runtime(_) => VerdictStatus::RuntimeError,
            _ => VerdictStatus::InternalError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_distinguish_failure_classes() {
        let e = JudgeError::UnsupportedLanguage("cobol".into());
        assert!(e.to_string().contains("Unsupported language"));

        let e = JudgeError::ToolchainUnavailable {
            language: "cpp".into(),
            hint: "C++ compiler (g++) is not installed".into(),
            reason: "failed to launch `g++`".into(),
        };
        assert!(e.to_string().contains("g++"));
        assert_eq!(e.status(), arbiter_common::VerdictStatus::ToolchainUnavailable);
    }
}
