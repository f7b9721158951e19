// Subcommand implementations

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context as _, Result};
use arbiter_common::JudgeRequest;
use arbiter_judge::{EngineConfig, JudgeEngine, MemoryStore, ToolchainRegistry};

pub struct Context {
    engine: JudgeEngine,
}

impl Context {
    pub fn new(languages: Option<&Path>, time_limit_ms: u64) -> Result<Self> {
        let registry = match languages {
            Some(path) => ToolchainRegistry::load(path)?,
            None => ToolchainRegistry::builtin(),
        };
        let mut config = EngineConfig::default();
        config.time_limit = Duration::from_millis(time_limit_ms);
        Ok(Self {
            engine: JudgeEngine::new(Arc::new(registry), config),
        })
    }
}

pub async fn languages(ctx: &Context) -> Result<()> {
    let registry = ctx.engine.registry();
    for id in registry.list_languages() {
        let spec = registry.resolve(&id).expect("listed language must resolve");
        match registry.probe(spec).await {
            Ok(()) => println!("  ✓ {}", id),
            Err(reason) => println!("  ✗ {} ({})", id, reason),
        }
    }
    Ok(())
}

/// `--input` accepts either a path to an input file or literal text.
fn resolve_input(input: Option<&str>) -> Result<String> {
    match input {
        None => Ok(String::new()),
        Some(value) => {
            let path = Path::new(value);
            if path.is_file() {
                std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read input file {}", path.display()))
            } else {
                Ok(value.to_string())
            }
        }
    }
}

pub async fn run(
    ctx: &Context,
    file: &Path,
    language: &str,
    input: Option<&str>,
) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read source file {}", file.display()))?;
    let input = resolve_input(input)?;

    match ctx.engine.run_custom(&code, language, &input).await {
        Ok(result) => {
            print!("{}", result.output);
            eprintln!("(finished in {} ms)", result.execution_time_ms);
            Ok(())
        }
        Err(e) => bail!("{}", e),
    }
}

pub async fn judge(
    ctx: &Context,
    file: &Path,
    language: &str,
    problem_file: &Path,
    problem_id: Option<i64>,
) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read source file {}", file.display()))?;

    let store = MemoryStore::load(problem_file)?;
    let problem_id = match problem_id {
        Some(id) => id,
        None => {
            let ids = store.problem_ids();
            match ids.as_slice() {
                [only] => *only,
                [] => bail!("Problem file defines no problems"),
                _ => bail!("Problem file defines several problems; pass --problem-id"),
            }
        }
    };

    let request = JudgeRequest {
        code,
        language: language.to_string(),
        problem_id,
        user_id: None,
        contest_id: None,
        custom_input: None,
        test_cases_override: None,
    };

    let verdict = ctx.engine.judge(&request, &store, &store).await?;

    println!("Verdict: {}", verdict.overall_status);
    if let Some(message) = &verdict.message {
        println!("  {}", message);
    }
    for case in &verdict.test_cases {
        if case.passed {
            println!("  ✓ case {} ({} ms)", case.index, case.time_ms);
        } else {
            println!("  ✗ case {} ({} ms)", case.index, case.time_ms);
            if let Some(expected) = &case.expected {
                println!("    expected: {:?}", expected);
            }
            if let Some(actual) = &case.actual {
                println!("    actual:   {:?}", actual);
            }
        }
    }
    println!(
        "{}/{} test cases passed",
        verdict.passed_count(),
        verdict.test_cases.len()
    );
    Ok(())
}
