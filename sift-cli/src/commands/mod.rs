//! CLI command implementations

pub mod check;
pub mod explain;
pub mod filter;
pub mod insights;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use sift_core::{Query, SiftContext};

/// Get the sift directory from environment or default
pub fn get_sift_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("SIFT_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".sift"))
        .context("Could not find home directory; set SIFT_DIR")
}

/// Get or create sift context
pub fn get_context() -> Result<SiftContext> {
    let sift_dir = get_sift_dir()?;

    std::fs::create_dir_all(&sift_dir)
        .with_context(|| format!("Failed to create sift directory: {:?}", sift_dir))?;

    SiftContext::new(&sift_dir).context("Failed to initialize sift context")
}

/// Read a query document from a path, `-`, or piped stdin
pub fn read_document(path: Option<&Path>) -> Result<String> {
    match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read query document: {:?}", p)),
        Some(_) => read_stdin(),
        None if atty::isnt(atty::Stream::Stdin) => read_stdin(),
        None => bail!("No query document provided. Pass a file, '-', or pipe from stdin."),
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read query document from stdin")?;
    Ok(buffer)
}

/// Resolve the query a command runs: a saved insight or a document
pub fn load_query(ctx: &SiftContext, path: Option<&Path>, saved: Option<&str>) -> Result<Query> {
    if let Some(name) = saved {
        return ctx.insight_service.load(name)?.ok_or_else(|| {
            anyhow!("Saved insight '{}' can no longer be read; save it again", name)
        });
    }

    let text = read_document(path)?;
    Query::validate(&text).map_err(|rejection| anyhow!("Invalid query document: {}", rejection))
}
