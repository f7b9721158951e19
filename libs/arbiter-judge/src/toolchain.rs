// Language toolchain registry: which compiler/interpreter to invoke for each
// supported language, and how.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A command as an explicit program + argument vector. Placeholders
/// (`{source}`, `{executable}`, `{classdir}`, `{mainclass}`) are substituted
/// per invocation from typed fields; nothing is ever passed through a shell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandTemplate {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn render(&self, vars: &CommandVars) -> (String, Vec<String>) {
        let program = vars.substitute(&self.program);
        let args = self.args.iter().map(|a| vars.substitute(a)).collect();
        (program, args)
    }
}

/// Substitution values for one invocation.
#[derive(Debug, Default, Clone)]
pub struct CommandVars {
    pub source: PathBuf,
    pub executable: PathBuf,
    pub class_dir: PathBuf,
    pub main_class: String,
}

impl CommandVars {
    fn substitute(&self, template: &str) -> String {
        template
            .replace("{source}", &self.source.to_string_lossy())
            .replace("{executable}", &self.executable.to_string_lossy())
            .replace("{classdir}", &self.class_dir.to_string_lossy())
            .replace("{mainclass}", &self.main_class)
    }
}

/// Everything the engine needs to know about one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainSpec {
    pub id: String,
    pub source_filename: String,
    /// None for interpreted languages.
    #[serde(default)]
    pub compile: Option<CommandTemplate>,
    pub run: CommandTemplate,
    /// Availability check; non-zero exit means the toolchain is missing.
    /// Must not contain placeholders.
    pub probe: CommandTemplate,
    #[serde(default)]
    pub main_class: Option<String>,
    /// Shown to users when the probe fails.
    pub install_hint: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ToolchainsJson {
    languages: Vec<ToolchainSpec>,
}

/// Immutable registry keyed by language id. Built once at process start and
/// shared read-only across concurrent judging calls.
#[derive(Debug, Clone)]
pub struct ToolchainRegistry {
    specs: HashMap<String, ToolchainSpec>,
}

impl ToolchainRegistry {
    /// The built-in table for the languages the platform ships with.
    pub fn builtin() -> Self {
        let specs = vec![
            ToolchainSpec {
                id: "cpp".to_string(),
                source_filename: "solution.cpp".to_string(),
                compile: Some(CommandTemplate::new(
                    "g++",
                    &["{source}", "-o", "{executable}"],
                )),
                run: CommandTemplate::new("{executable}", &[]),
                probe: CommandTemplate::new("g++", &["--version"]),
                main_class: None,
                install_hint: "C++ compiler (g++) is not installed. Please install g++ and add it to PATH.".to_string(),
            },
            ToolchainSpec {
                id: "java".to_string(),
                source_filename: "Solution.java".to_string(),
                compile: Some(CommandTemplate::new("javac", &["{source}"])),
                run: CommandTemplate::new(
                    "java",
                    &["-classpath", "{classdir}", "{mainclass}"],
                ),
                probe: CommandTemplate::new("javac", &["-version"]),
                main_class: Some("Solution".to_string()),
                install_hint: "Java compiler (javac) is not installed. Please install a JDK and add it to PATH.".to_string(),
            },
            ToolchainSpec {
                id: "python".to_string(),
                source_filename: "solution.py".to_string(),
                compile: None,
                run: CommandTemplate::new("python3", &["{source}"]),
                probe: CommandTemplate::new("python3", &["--version"]),
                main_class: None,
                install_hint: "Python interpreter is not installed. Please install Python 3 and add it to PATH.".to_string(),
            },
        ];
        Self::from_specs(specs)
    }

    /// Load toolchain definitions from a JSON file (`config/languages.json`),
    /// replacing the built-in table.
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!(
                "Toolchain config file not found: {}",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(config_path)
            .context("Failed to read languages.json")?;
        let parsed: ToolchainsJson =
            serde_json::from_str(&content).context("Failed to parse languages.json")?;

        if parsed.languages.is_empty() {
            bail!("Toolchain config defines no languages");
        }
        Ok(Self::from_specs(parsed.languages))
    }

    /// Build a registry from explicit specs (custom deployments, tests).
    pub fn from_specs(specs: Vec<ToolchainSpec>) -> Self {
        let mut map = HashMap::new();
        for spec in specs {
            map.insert(spec.id.clone(), spec);
        }
        Self { specs: map }
    }

    pub fn resolve(&self, language_id: &str) -> Option<&ToolchainSpec> {
        self.specs.get(language_id)
    }

    pub fn list_languages(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.specs.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Run the availability probe. `Err` carries a human-readable reason.
    pub async fn probe(&self, spec: &ToolchainSpec) -> std::result::Result<(), String> {
        let (program, args) = spec.probe.render(&CommandVars::default());
        debug!(language = %spec.id, program = %program, "Probing toolchain");

        let status = tokio::process::Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;

        match status {
            Ok(s) if s.success() => Ok(()),
            Ok(s) => Err(format!("`{}` exited with {}", program, s)),
            Err(e) => Err(format!("failed to launch `{}`: {}", program, e)),
        }
    }
}
