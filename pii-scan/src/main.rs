//! Lê um documento da entrada padrão, roda os reconhecedores baseados em
//! regras e imprime os spans de PII consolidados em JSON.
//!
//! Ambiente:
//! - `PII_RULES`: caminho de um arquivo JSON de regras (padrão: regras embutidas)
//! - `RUST_LOG`: filtro de log, `info` quando ausente

use std::io::Read;
use std::process::ExitCode;

use pii_core::{PiiPipeline, RuleSet, Span};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct ScanReport<'a> {
    rules_version: u32,
    candidates: usize,
    entities: &'a [Span],
}

fn load_rules() -> Result<RuleSet, pii_core::ConfigError> {
    match std::env::var("PII_RULES") {
        Ok(path) => {
            info!(path = %path, "loading rule set");
            RuleSet::from_path(path)
        }
        Err(_) => Ok(RuleSet::default()),
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let rules = load_rules()?;
    let pipeline = PiiPipeline::from_rules(&rules)?;

    let mut text = String::new();
    std::io::stdin().read_to_string(&mut text)?;

    let detection = pipeline.detect(&text);
    let report = ScanReport {
        rules_version: rules.version,
        candidates: detection.candidate_count,
        entities: &detection.entities,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "scan failed");
            ExitCode::FAILURE
        }
    }
}
