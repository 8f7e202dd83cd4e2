pub mod blocks;
pub mod codegen;
pub mod context;
pub mod program;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

use anyhow::{Context, Result};
use codegen::GeneratedCode;
use program::Program;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

#[cfg(all(target_arch = "wasm32", feature = "wasm-bindings"))]
pub mod wasm;

#[cfg(not(target_arch = "wasm32"))]
pub fn run_cli(args: &cli::Args) -> Result<()> {
    if args.definitions {
        if args.input.is_some() && args.output.is_some() {
            anyhow::bail!("--definitions takes at most one path (the output file); no program is read.");
        }
        // A lone positional path names the destination here.
        let destination = args.output.as_deref().or(args.input.as_deref());
        let progress = CliProgress::new("Definitions", 1 + usize::from(destination.is_some()));
        progress.emit(1, "Rendering block definitions");
        let mut text = serde_json::to_string_pretty(&blocks::definitions_json()?)?;
        text.push('\n');
        return deliver(&progress, 2, destination, &text);
    }

    let input = args
        .input
        .as_deref()
        .context("An INPUT program is required unless --definitions is given.")?;
    let progress = CliProgress::new("Generate", 3 + usize::from(args.output.is_some()));

    progress.emit(1, "Resolving input path");
    let input = canonicalize_file(input)?;

    progress.emit(2, "Loading program");
    let program = load_program(&input)?;

    progress.emit(3, "Generating code");
    let generated = codegen::generate(&program);
    let text = render_output(&generated, args.print_expressions);

    deliver(&progress, 4, args.output.as_deref(), &text)
}

#[cfg(not(target_arch = "wasm32"))]
fn deliver(progress: &CliProgress, stage: usize, output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => {
            progress.emit(stage, "Writing output");
            write_atomically(path, text.as_bytes())
        }
        None => {
            std::io::stdout().write_all(text.as_bytes())?;
            Ok(())
        }
    }
}

pub fn load_program(path: &Path) -> Result<Program> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'.", path.display()))?;
    Program::from_json_str(&text).with_context(|| format!("Invalid program '{}'.", pretty_path(path)))
}

/// Generates the assembled source for a JSON program.
pub fn generate_from_json_str(text: &str) -> Result<String> {
    let program = Program::from_json_str(text)?;
    Ok(codegen::generate(&program).source())
}

pub fn render_output(generated: &GeneratedCode, print_expressions: bool) -> String {
    let mut out = generated.source();
    if print_expressions {
        for expr in &generated.expressions {
            out.push_str("# expr: ");
            out.push_str(&expr.code);
            out.push('\n');
        }
    }
    out
}

pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let mut temp = tempfile::NamedTempFile::new_in(parent)
        .with_context(|| format!("Failed to create temporary file in '{}'.", parent.display()))?;
    temp.write_all(bytes)?;
    temp.persist(path)
        .map_err(|e| anyhow::anyhow!("Failed to write '{}': {}", path.display(), e.error))?;
    Ok(())
}

pub fn canonicalize_file(path: &Path) -> Result<PathBuf> {
    if !path.exists() || !path.is_file() {
        return Err(anyhow::anyhow!("Input file not found: '{}'.", path.display()));
    }
    Ok(path.canonicalize()?)
}

fn pretty_path(path: &Path) -> String {
    let raw = path.display().to_string();
    if let Some(stripped) = raw.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        raw
    }
}

#[cfg(not(target_arch = "wasm32"))]
struct CliProgress {
    prefix: &'static str,
    total: usize,
}

#[cfg(not(target_arch = "wasm32"))]
impl CliProgress {
    fn new(prefix: &'static str, total: usize) -> Self {
        Self {
            prefix,
            total: total.max(1),
        }
    }

    fn emit(&self, step: usize, label: &str) {
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
