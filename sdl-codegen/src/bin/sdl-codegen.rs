//! CLI: reads a schema document from a file or stdin, emits SDL to stdout.
//!
//! Usage:
//!   sdl-codegen schemas.json > schema.graphql
//!   sdl-codegen --strict --scalar uuid=ID < schemas.json
//!   sdl-codegen --config sdl.json --only User schemas.json

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use sdl_codegen::{compile_batch, compile_single, parse_document, CompileOptions, ScalarKey};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdl-codegen")]
#[command(about = "Compile a JSON schema document into SDL type definitions")]
struct Cli {
    /// Schema document; reads stdin when omitted
    file: Option<PathBuf>,

    /// JSON config file (scalars, strict, preserveEnumCase)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Fail on object fields that reference unregistered schemas
    #[arg(long)]
    strict: bool,

    /// Emit enum values verbatim instead of upper-casing them
    #[arg(long)]
    preserve_enum_case: bool,

    /// Override a scalar name, e.g. `uuid=ID` or `json=JSONObject`
    #[arg(long = "scalar", value_name = "KEY=NAME", value_parser = parse_scalar_override)]
    scalars: Vec<(ScalarKey, String)>,

    /// Emit only this schema, resolving references against the document
    #[arg(long, value_name = "NAME")]
    only: Option<String>,
}

fn parse_scalar_override(s: &str) -> Result<(ScalarKey, String), String> {
    let (key, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=NAME, got '{s}'"))?;
    let key = ScalarKey::parse(key.trim()).ok_or_else(|| {
        format!("unknown scalar key '{key}'; use string, uuid, datetime, date, int, float, boolean, or json")
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err("scalar name must not be empty".into());
    }
    Ok((key, name.to_string()))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(sdl) => println!("{sdl}"),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<String> {
    let mut options = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read config {}", path.display()))?;
            serde_json::from_str::<CompileOptions>(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => CompileOptions::default(),
    };
    options.strict |= cli.strict;
    options.preserve_enum_case |= cli.preserve_enum_case;
    for (key, name) in cli.scalars {
        options.scalars.set(key, name);
    }

    let json_str = match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("cannot read stdin")?;
            buf
        }
    };
    let json: serde_json::Value = serde_json::from_str(&json_str).context("invalid JSON")?;
    let document = parse_document(&json).context("invalid schema document")?;

    let sdl = match &cli.only {
        Some(name) => {
            let Some(schema) = document.schemas.get(name) else {
                bail!("schema '{name}' is not declared in the document");
            };
            options.types.merge(&document.registry());
            compile_single(name, schema, &options)?
        }
        None => compile_batch(&document.schemas, &options)?,
    };
    Ok(sdl)
}
