//! Interactive session: credential check, city prompt, one agent run.

use crate::agent::AgentRunner;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// Run one session, reading the city from `input` and writing the
/// conversation to `output`.
///
/// Missing credentials print a diagnostic and return failure before any
/// prompt or network request.
pub async fn run<R, W>(config: &Config, mut input: R, output: W) -> AppResult<ExitCode>
where
    R: BufRead,
    W: Write + Send + 'static,
{
    let output = Arc::new(Mutex::new(output));

    let credentials = match config.credentials() {
        Ok(c) => c,
        Err(AppError::MissingCredentials) => {
            say(&output, "Error: GOOGLE_API_KEY or OPENWEATHER_API_KEY not found.")?;
            say(&output, "Please make sure both are set in your .env file.")?;
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e),
    };

    {
        let mut out = output.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(b"Please enter a city name (e.g., London, Tokyo): ")?;
        out.flush()?;
    }
    let mut line = String::new();
    input.read_line(&mut line)?;
    let city = line.trim();
    if city.is_empty() {
        say(&output, "No city entered. Exiting.")?;
        return Ok(ExitCode::SUCCESS);
    }

    say(&output, "Initializing agent...")?;
    let sink_output = output.clone();
    let agent = AgentRunner::initialize(config, &credentials)?.with_progress(Arc::new(
        move |progress: &str| {
            // Write errors are ignored for progress lines
            let _ = say(&sink_output, progress);
        },
    ));
    say(
        &output,
        &format!(
            "Agent initialized successfully with {} tools (including live weather).",
            agent.tool_names().len()
        ),
    )?;

    let query = format!("What's the weather in {}?", city);
    say(&output, &format!("\n--- Running agent with query: '{}' ---", query))?;
    let response = agent.run(&query).await;

    say(&output, "\n--- Final Response ---")?;
    say(&output, &response)?;

    info!("Done");
    Ok(ExitCode::SUCCESS)
}

fn say<W: Write>(output: &Mutex<W>, line: &str) -> std::io::Result<()> {
    let mut out = output.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(out, "{}", line)?;
    out.flush()
}
