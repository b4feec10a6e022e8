use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio_stream::wrappers::ReceiverStream;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use coda_bank::Session;
use coda_bank::config::{Args, Config, Mode};
use coda_bank::csv::{read_operations, write_history};
use coda_bank::shell;
use coda_bank::store::JsonFileStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from(Args::parse());
    let store = JsonFileStore::new(&config.data_dir);
    let mut session = Session::open_with(store, config.default_account())
        .await
        .with_context(|| format!("failed to open account in {}", config.data_dir.display()))?;

    match config.mode {
        Mode::ExportHistory => {
            write_history(session.ledger().records(), std::io::stdout().lock())?;
        }
        Mode::Batch(path) => {
            if path.extension().is_none_or(|ext| ext != "csv") {
                warn!(path = %path.display(), "input file seems to not be a csv file");
            }

            let operations = read_operations(path.clone())?;
            let (op_sender, op_receiver) = tokio::sync::mpsc::channel(16);

            tokio::spawn(async move {
                for result in operations {
                    match result {
                        Ok(op) => {
                            // receiver is gone once the session stopped on an error
                            if op_sender.send(op).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("{e}");
                        }
                    }
                }
            });

            let summary = session
                .run(ReceiverStream::new(op_receiver))
                .await
                .context("batch stopped")?;

            println!("applied: {}, rejected: {}", summary.applied, summary.rejected);
            println!("{}", shell::render_balance(session.state()));
        }
        Mode::Interactive => {
            println!("{}", shell::HELP);
            shell::interact(
                &mut session,
                BufReader::new(tokio::io::stdin()),
                tokio::io::stdout(),
                config.history_limit,
            )
            .await?;
        }
    }

    Ok(())
}
