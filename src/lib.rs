pub mod ast;
pub mod codegen;
pub mod loader;
pub mod names;
pub mod semantic;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

use anyhow::{Context, Result};
use codegen::EmitOptions;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    if args.check && args.output.is_some() {
        anyhow::bail!("--check cannot be used with an output path.");
    }

    // Stage reporting stays off the stdout path so piped output is clean.
    let progress = CliProgress::new(
        if args.check { "Check" } else { "Generate" },
        if args.check { 3 } else { 4 },
        args.output.is_some(),
    );

    progress.emit(1, "Resolving input path");
    let input = canonicalize_file(&args.input)?;
    let source = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read '{}'.", input.display()))?;

    progress.emit(2, "Loading block program");
    let program = loader::load_program(&source)?;

    progress.emit(3, "Running semantic checks");
    let report =
        semantic::analyze(&program).map_err(|e| anyhow::anyhow!("Semantic error: {}", e))?;
    for warning in &report.warnings {
        eprintln!("warning: {}", warning.message);
    }
    if args.deny_warnings && !report.warnings.is_empty() {
        anyhow::bail!(
            "Refusing to continue with {} warning(s).",
            report.warnings.len()
        );
    }
    if args.check {
        return Ok(());
    }

    progress.emit(4, "Generating source");
    let options = EmitOptions {
        trace: !args.no_trace,
    };
    let code = codegen::generate(&program, options);

    match &args.output {
        Some(output) => {
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(output, code.as_bytes())
                .with_context(|| format!("Failed to write '{}'.", output.display()))?;
        }
        None => print!("{}", code),
    }

    Ok(())
}

/// Loads, validates, and generates in one pass. Semantic warnings are
/// tolerated here; callers that want them use the module passes directly.
pub fn generate_source(source: &str, options: EmitOptions) -> Result<String> {
    let program = loader::load_program(source)?;
    semantic::analyze(&program).map_err(|e| anyhow::anyhow!("Semantic error: {}", e))?;
    Ok(codegen::generate(&program, options))
}

pub fn generate_file(input: &Path, options: EmitOptions) -> Result<String> {
    let input = canonicalize_file(input)?;
    let source = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read '{}'.", input.display()))?;
    generate_source(&source, options)
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!(
            "Input file not found: '{}'.",
            path.display()
        ));
    }
    Ok(path.canonicalize()?)
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
    enabled: bool,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize, enabled: bool) -> Self {
        Self {
            prefix,
            total: total.max(1),
            enabled,
        }
    }

    fn emit(&self, step: usize, label: &str) {
        if !self.enabled {
            return;
        }
        let step = step.clamp(1, self.total);
        let bar = render_progress_bar(step, self.total, 14);
        eprintln!(
            "[{}] {}... ({}/{}) {}",
            self.prefix, label, step, self.total, bar
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_progress_bar(step: usize, total: usize, width: usize) -> String {
    let width = width.max(1);
    let filled = ((step * width) + (total / 2)) / total;
    let mut s = String::with_capacity(width + 2);
    s.push('[');
    for i in 0..width {
        s.push(if i < filled { '=' } else { '-' });
    }
    s.push(']');
    s
}
