//! CLI: schema → (rust | reflect | build)
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};

use crate::naming::SnakeCase;
use crate::schema::Schema;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate node builders, type guards and assertions from a tagged-variant schema
#[derive(Parser, Debug)]
#[command(name = "nodegen", version)]
pub struct CommandLineInterface {
    /// log level on stderr (error, warn, info, debug, trace); RUST_LOG overrides
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit the Rust node module
    Rust(RustOut),
    /// print the group → members reflection map as JSON
    Reflect(ReflectOut),
    /// construct one node from JSON arguments, with the same checks a builder applies
    Build(BuildNode),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// JSON Pointer to the definitions inside each document (e.g. /definitions)
    #[arg(long)]
    json_pointer: Option<String>,

    /// One or more schema documents, merged in order. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct RustOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// prefix for builder function names (e.g. `build_`)
    #[arg(long, default_value = "")]
    builder_prefix: String,

    /// output .rs file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct ReflectOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct BuildNode {
    #[command(flatten)]
    input_settings: InputSettings,

    /// node type to construct
    #[arg(long = "type")]
    type_name: String,

    /// constructor arguments as a JSON object keyed by field name
    #[arg(long, default_value = "{}")]
    args: String,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_schema(&self) -> Result<Schema> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut parts = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let part = Schema::load_file(&source_path, self.json_pointer.as_deref())?;
            parts.push(part);
        }
        let schema = Schema::merge(parts)?;
        tracing::info!(types = schema.len(), "schema loaded");
        Ok(schema)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Rust(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                let schema = target.input_settings.load_schema()?;
                let naming = SnakeCase::with_builder_prefix(target.builder_prefix.clone());

                match target.out.as_ref() {
                    Some(out) => {
                        // render fully before touching the file
                        let rust_src = crate::driver::generate_to_string(&schema, &naming)?;
                        write_file(out, &rust_src)?;
                    }
                    None => {
                        let mut stdout = std::io::stdout().lock();
                        crate::driver::generate(&schema, &naming, &mut stdout)?;
                    }
                }
            }
            Command::Reflect(target) => {
                let schema = target.input_settings.load_schema()?;
                let map = crate::driver::reflect(&schema, &SnakeCase::default())?;
                let map_src = serde_json::to_string_pretty(&map)?;
                match target.out.as_ref() {
                    Some(out) => write_file(out, &map_src)?,
                    None => println!("{map_src}"),
                }
            }
            Command::Build(target) => {
                let schema = target.input_settings.load_schema()?;
                let args = crate::path_de::from_str_with_path::<Map<String, Value>>(&target.args)
                    .map_err(|message| anyhow::anyhow!("invalid --args: {message}"))?;
                let runtime = crate::runtime::Runtime::new(&schema)?;
                let node = runtime.build(&target.type_name, &args)?;
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", serde_json::to_string_pretty(&node)?)?;
            }
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_file(out: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(out, contents).with_context(|| format!("failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), "wrote output");
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            // glob results come back sorted, which keeps merge order stable
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
