//! `careplan submit` and `careplan ping`: talk to a running server.

use anyhow::{Result, bail};

use careplan_core::PlanRequest;

use crate::client::PlannerClient;
use crate::output;

/// Names of the required intake fields that are absent or blank.
fn missing_fields(request: &PlanRequest) -> Vec<&'static str> {
    let blank = |value: &Option<String>| value.as_deref().is_none_or(|v| v.trim().is_empty());
    let mut missing = Vec::new();
    if blank(&request.patient_name) {
        missing.push("patient name");
    }
    if blank(&request.condition) {
        missing.push("condition");
    }
    if !request.has_goal() {
        missing.push("goal");
    }
    missing
}

/// Execute `careplan submit`.
///
/// Patient name, condition and goal are checked before anything is sent, so
/// an incomplete request never reaches the network.
pub async fn run_submit(server: &str, request: &PlanRequest, json: bool) -> Result<()> {
    let missing = missing_fields(request);
    if !missing.is_empty() {
        bail!("missing required fields: {}", missing.join(", "));
    }

    let client = PlannerClient::new(server)?;
    eprintln!("Submitting plan request to {}...", client.base_url());
    let result = client.submit(request).await?;
    output::print_result(&result, json)
}

/// Execute `careplan ping`.
pub async fn run_ping(server: &str) -> Result<()> {
    let client = PlannerClient::new(server)?;
    if client.ping().await {
        println!("{} is reachable", client.base_url());
        Ok(())
    } else {
        bail!("{} is not reachable", client.base_url());
    }
}
