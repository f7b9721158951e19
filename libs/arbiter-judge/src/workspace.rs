// Per-call scratch directory for source, input and captured output files.

use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::toolchain::ToolchainSpec;

/// Isolated filesystem area owned by exactly one judging call.
///
/// The directory name carries a fresh UUID, which is the sole isolation
/// mechanism between concurrent calls. Dropping the workspace removes the
/// directory, so cleanup happens on the normal path, on early return and on
/// panic alike.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    pub source_file: PathBuf,
    pub executable_file: PathBuf,
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub error_file: PathBuf,
    released: bool,
}

impl Workspace {
    /// Create `<root>/arbiter-<uuid>/` and lay out the per-call file paths.
    /// Only the directory is created here; files appear as the call writes them.
    pub fn create(root: &Path, spec: &ToolchainSpec) -> io::Result<Self> {
        let path = root.join(format!("arbiter-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        debug!(workspace = %path.display(), "Workspace created");

        let mut executable_file = path.join("solution");
        if cfg!(windows) {
            executable_file.set_extension("exe");
        }

        Ok(Self {
            source_file: path.join(&spec.source_filename),
            executable_file,
            input_file: path.join("input.txt"),
            output_file: path.join("output.txt"),
            error_file: path.join("error.txt"),
            path,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_source(&self, code: &str) -> io::Result<()> {
        std::fs::write(&self.source_file, code)
    }

    pub fn write_input(&self, input: &str) -> io::Result<()> {
        std::fs::write(&self.input_file, input)
    }

    pub fn read_output(&self) -> String {
        std::fs::read_to_string(&self.output_file).unwrap_or_default()
    }

    pub fn read_errors(&self) -> String {
        std::fs::read_to_string(&self.error_file).unwrap_or_default()
    }

    /// Recursively delete the directory. Idempotent and infallible from the
    /// caller's perspective; a failed removal is logged, never propagated.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(workspace = %self.path.display(), error = %e, "Failed to remove workspace");
            }
        } else {
            debug!(workspace = %self.path.display(), "Workspace removed");
        }
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        self.release();
    }
}
