// Process runner: invokes the external compiler/interpreter with stdio
// redirected to workspace files and a wall-clock deadline on execution.

use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::toolchain::{CommandVars, ToolchainSpec};
use crate::workspace::Workspace;

#[derive(Debug, Clone)]
pub struct CompileOutcome {
    pub ok: bool,
    pub stderr: String,
}

#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// None when the process was killed (deadline overrun or signal).
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub timed_out: bool,
}

impl RunOutcome {
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

fn command_vars(workspace: &Workspace, spec: &ToolchainSpec) -> CommandVars {
    CommandVars {
        source: workspace.source_file.clone(),
        executable: workspace.executable_file.clone(),
        class_dir: workspace.path().to_path_buf(),
        main_class: spec.main_class.clone().unwrap_or_else(|| "Solution".to_string()),
    }
}

/// Run the compile command, if the language has one. Compiler stderr is
/// captured to the workspace error file (truncating it) and returned on a
/// non-zero exit. Languages without a compile step succeed trivially.
pub async fn compile(workspace: &Workspace, spec: &ToolchainSpec) -> Result<CompileOutcome> {
    let Some(template) = &spec.compile else {
        return Ok(CompileOutcome {
            ok: true,
            stderr: String::new(),
        });
    };

    let (program, args) = template.render(&command_vars(workspace, spec));
    debug!(language = %spec.id, program = %program, "Compiling");

    let stderr_file = std::fs::File::create(&workspace.error_file)
        .context("Failed to create compiler stderr capture file")?;

    let status = tokio::process::Command::new(&program)
        .args(&args)
        .current_dir(workspace.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr_file))
        .status()
        .await
        .with_context(|| format!("Failed to spawn compiler `{}`", program))?;

    if status.success() {
        Ok(CompileOutcome {
            ok: true,
            stderr: String::new(),
        })
    } else {
        Ok(CompileOutcome {
            ok: false,
            stderr: workspace.read_errors(),
        })
    }
}

/// Run the program once: stdin from the input file, stdout to the output
/// file, stderr appended to the error file. The deadline is enforced; a
/// child still running when it expires is killed and reported as timed out.
pub async fn run(
    workspace: &Workspace,
    spec: &ToolchainSpec,
    time_limit: Duration,
) -> Result<RunOutcome> {
    let (program, args) = spec.run.render(&command_vars(workspace, spec));

    let stdin_file = std::fs::File::open(&workspace.input_file)
        .context("Failed to open input file")?;
    let stdout_file = std::fs::File::create(&workspace.output_file)
        .context("Failed to create output capture file")?;
    let stderr_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&workspace.error_file)
        .context("Failed to open stderr capture file")?;

    let mut child = tokio::process::Command::new(&program)
        .args(&args)
        .current_dir(workspace.path())
        .stdin(Stdio::from(stdin_file))
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .spawn()
        .with_context(|| format!("Failed to spawn `{}`", program))?;

    let start = Instant::now();
    match tokio::time::timeout(time_limit, child.wait()).await {
        Ok(status) => {
            let status = status.context("Failed to wait for child process")?;
            let duration_ms = start.elapsed().as_millis() as u64;
            debug!(language = %spec.id, duration_ms, code = ?status.code(), "Run finished");
            Ok(RunOutcome {
                exit_code: status.code(),
                duration_ms,
                timed_out: false,
            })
        }
        Err(_) => {
            warn!(language = %spec.id, limit_ms = time_limit.as_millis() as u64, "Execution deadline exceeded, killing process");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill timed-out process");
            }
            // Reap the child so it does not linger as a zombie.
            let _ = child.wait().await;
            Ok(RunOutcome {
                exit_code: None,
                duration_ms: start.elapsed().as_millis() as u64,
                timed_out: true,
            })
        }
    }
}
