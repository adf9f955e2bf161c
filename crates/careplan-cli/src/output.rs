//! Human-readable rendering of plan results.

use anyhow::{Context, Result};

use careplan_core::PlanResult;

/// Render a result as plain text: the summary, then one line per step.
pub fn render_text(result: &PlanResult) -> String {
    let mut out = String::with_capacity(result.summary.len() + 256);

    out.push_str("Plan summary\n");
    out.push_str("------------\n");
    out.push_str(result.summary.trim_end());
    out.push_str("\n\n");

    out.push_str("Resource check\n");
    out.push_str("--------------\n");
    if result.resource_check.is_empty() {
        out.push_str("  (no steps found)\n");
    } else {
        for annotation in &result.resource_check {
            let tag = if annotation.available {
                "[available]"
            } else {
                "[missing]  "
            };
            out.push_str(&format!("  {tag} {}\n", annotation.step));
        }
        let available = result
            .resource_check
            .iter()
            .filter(|a| a.available)
            .count();
        out.push_str(&format!(
            "\n{available}/{} steps have resources available\n",
            result.resource_check.len()
        ));
    }

    out
}

/// Render a result as pretty-printed wire JSON.
pub fn render_json(result: &PlanResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize plan result")
}

/// Print a result to stdout in the requested format.
pub fn print_result(result: &PlanResult, json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(result)?);
    } else {
        print!("{}", render_text(result));
    }
    Ok(())
}
