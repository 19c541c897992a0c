// orchestrator-service-rs/src/main.rs
// Main entry point for orchestrator-service.
// Reads one check-in JSON object per stdin line and prints one evaluation JSON
// object per line. With --enqueue, check-ins go through the background worker.
// With --extract, each line is a raw conversation and the extracted commitment
// is printed. With --audit, each line is a delivery audit request.

use std::time::Duration;

use anyhow::Context;
use config_rs::PipelineSettings;
use orchestrator::{init_logging, AppContext, JobStatus};
use serde::Deserialize;
use serde_json::json;
use shared_types::{CheckIn, PipelineEvaluation};
use tokio::io::{AsyncBufReadExt, BufReader};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Evaluate,
    Enqueue,
    Extract,
    Audit,
}

impl Mode {
    fn from_args() -> Self {
        let mut mode = Self::Evaluate;
        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--enqueue" => mode = Self::Enqueue,
                "--extract" => mode = Self::Extract,
                "--audit" => mode = Self::Audit,
                other => tracing::warn!(arg = other, "unknown_argument_ignored"),
            }
        }
        mode
    }
}

#[derive(Debug, Deserialize)]
struct AuditRequest {
    promised_tasks: Vec<String>,
    claims: String,
    evidence: String,
}

fn print_line(value: &serde_json::Value) {
    println!("{}", value);
}

async fn run_sync(ctx: &AppContext, check_ins: Vec<CheckIn>) -> anyhow::Result<()> {
    for check_in in check_ins {
        let evaluation = match ctx.orchestrator.evaluate_check_in(&check_in).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                tracing::error!(user_id = %check_in.user_id, error = %e, "evaluation_failed");
                PipelineEvaluation::delayed_fallback(&e.to_string())
            }
        };
        print_line(&serde_json::to_value(&evaluation).context("serializing evaluation")?);
    }
    Ok(())
}

async fn run_extract(ctx: &AppContext, conversations: Vec<String>) -> anyhow::Result<()> {
    for conversation in conversations {
        match ctx.performance.extract_commitment(&conversation).await {
            Ok(record) => {
                print_line(&serde_json::to_value(&record).context("serializing commitment")?)
            }
            Err(e) => {
                tracing::error!(error = %e, "commitment_extraction_failed");
                print_line(&json!({ "error": e.to_string() }));
            }
        }
    }
    Ok(())
}

async fn run_audit(ctx: &AppContext, lines: Vec<String>) -> anyhow::Result<()> {
    for line in lines {
        let request: AuditRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "audit_request_parse_failed");
                print_line(&json!({ "error": format!("invalid audit request: {}", e) }));
                continue;
            }
        };
        match ctx
            .performance
            .audit_delivery(&request.promised_tasks, &request.claims, &request.evidence)
            .await
        {
            Ok(audit) => print_line(&serde_json::to_value(&audit).context("serializing audit")?),
            Err(e) => {
                tracing::error!(error = %e, "delivery_audit_failed");
                print_line(&json!({ "error": e.to_string() }));
            }
        }
    }
    Ok(())
}

async fn run_enqueued(ctx: &AppContext, check_ins: Vec<CheckIn>) -> anyhow::Result<()> {
    let mut job_ids = Vec::with_capacity(check_ins.len());
    for check_in in check_ins {
        job_ids.push(ctx.worker().enqueue(check_in).await?);
    }

    for job_id in job_ids {
        let status = loop {
            match ctx.worker().status(&job_id) {
                Some(status) if status.is_terminal() => break status,
                Some(_) => tokio::time::sleep(POLL_INTERVAL).await,
                None => break JobStatus::Failed("unknown job".to_string()),
            }
        };
        print_line(&json!({ "job_id": job_id, "status": status }));
    }
    Ok(())
}

fn parse_check_ins(lines: Vec<String>) -> Vec<CheckIn> {
    lines
        .into_iter()
        .filter_map(|line| match serde_json::from_str::<CheckIn>(&line) {
            Ok(check_in) => Some(check_in),
            Err(e) => {
                tracing::warn!(error = %e, "check_in_parse_failed");
                print_line(&json!({ "error": format!("invalid check-in: {}", e) }));
                None
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = PipelineSettings::from_env();
    init_logging(&settings).context("installing tracing subscriber")?;

    let mode = Mode::from_args();
    let ctx = AppContext::init(settings).await;

    let mut input = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if !line.trim().is_empty() {
            input.push(line);
        }
    }

    let outcome = match mode {
        Mode::Evaluate => run_sync(&ctx, parse_check_ins(input)).await,
        Mode::Enqueue => run_enqueued(&ctx, parse_check_ins(input)).await,
        Mode::Extract => run_extract(&ctx, input).await,
        Mode::Audit => run_audit(&ctx, input).await,
    };

    ctx.shutdown().await;
    outcome
}
