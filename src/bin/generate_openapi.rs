//! Dumps the SunCool API's OpenAPI document as pretty-printed JSON, for
//! dashboard client generation and docs hosting.
//!
//! Usage:
//!   cargo run --bin generate_openapi                   # to stdout
//!   cargo run --bin generate_openapi -- openapi.json   # to a file

use std::{
    env, fs,
    io::{self, Write},
};

use anyhow::{Context, Result};
use suncool_service::api::handlers::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("failed to serialise the OpenAPI document")?;

    match env::args().nth(1) {
        Some(path) => {
            fs::write(&path, &json).with_context(|| format!("failed to write {path}"))?;
            eprintln!("OpenAPI document written to {path}");
        }
        None => {
            io::stdout()
                .write_all(json.as_bytes())
                .context("failed to write to stdout")?;
        }
    }

    Ok(())
}
