//! Tab rail coordinator over stdin/stdout.
//!
//! A thin browser-side shim forwards host events, page messages and host
//! replies as newline-delimited JSON on stdin, and executes the host
//! requests the coordinator writes to stdout. See `tabrail::bridge` for the
//! line formats. Logs go to stderr.

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::Value;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use tabrail::bridge::{ready_line, route_input};
use tabrail::cli::{run_config, Cli, Command};
use tabrail::coordinator::Coordinator;
use tabrail::event_loop::{self, CoordinatorEvent};
use tabrail::host::stdio_host::StdioHost;
use tabrail::logging;
use tabrail::services::settings_engine::SettingsEngineTrait;
use tabrail::types::settings::CoordinatorSettings;

fn load_settings(cli: &Cli) -> CoordinatorSettings {
    let mut engine = cli.settings_engine();
    match engine.load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("tabrail: {} ({}), using defaults", e, engine.get_config_path());
            CoordinatorSettings::default()
        }
    }
}

/// Write outbound lines until every sender is gone.
async fn write_output(mut out: mpsc::UnboundedReceiver<Value>) {
    let mut stdout = tokio::io::stdout();
    while let Some(value) = out.recv().await {
        let line = format!("{}\n", value);
        if stdout.write_all(line.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            break;
        }
    }
}

async fn serve(cli: &Cli) {
    let settings = load_settings(cli);
    logging::init(cli.debug || settings.logging.debug);

    let (out_tx, out_rx) = mpsc::unbounded_channel::<Value>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<CoordinatorEvent>();

    let host = StdioHost::new(
        out_tx.clone(),
        Duration::from_millis(settings.bridge.request_timeout_ms),
    );
    let mut coordinator = Coordinator::new(host.clone(), settings);
    tracing::info!(session = %coordinator.session_id(), "coordinator starting");

    out_tx.send(ready_line(coordinator.session_id())).ok();

    let writer = tokio::spawn(write_output(out_rx));
    let reader = async move {
        route_input(BufReader::new(tokio::io::stdin()), &host, &event_tx, &out_tx).await;
        // Closing the event channel ends the loop.
        drop(event_tx);
    };
    tokio::join!(reader, event_loop::run(&mut coordinator, event_rx));

    // The coordinator still holds a sender through its host; drop it so the
    // writer drains and exits.
    drop(coordinator);
    writer.await.ok();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match &cli.command {
        Some(Command::Config { action }) => {
            let mut engine = cli.settings_engine();
            match run_config(&mut engine, action) {
                Ok(output) => {
                    println!("{}", output);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("tabrail: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        None => {
            serve(&cli).await;
            ExitCode::SUCCESS
        }
    }
}
