//! `careplan plan`: run the pipeline in-process.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use careplan_core::PlanningPipeline;

use crate::output;

const GOAL_PROMPT: &str = "Enter your healthcare planning goal: ";

/// Execute `careplan plan`.
///
/// When `goal` is `None` the user is prompted for one on stdin.
pub async fn run_plan(pipeline: &PlanningPipeline, goal: Option<String>, json: bool) -> Result<()> {
    let goal = match goal {
        Some(goal) => goal,
        None => {
            let mut stdin = BufReader::new(tokio::io::stdin());
            let mut stderr = tokio::io::stderr();
            read_goal(&mut stdin, &mut stderr).await?
        }
    };

    eprintln!("Generating plan...");
    let result = pipeline.run(&goal).await?;
    output::print_result(&result, json)
}

/// Show the prompt on `out` and read one line from `input`.
///
/// Returns the line without its trailing newline. End of input yields an
/// empty goal, which the pipeline rejects.
pub async fn read_goal<R, W>(input: &mut R, out: &mut W) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    out.write_all(GOAL_PROMPT.as_bytes())
        .await
        .context("failed to write prompt")?;
    out.flush().await.context("failed to flush prompt")?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .await
        .context("failed to read goal from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
