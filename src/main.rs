use std::io;
use std::process::ExitCode;

use points_ledger::LedgerService;
use points_ledger::config::Config;
use points_ledger::csv::{read_commands, write_balances};
use points_ledger::ledger::Authenticated;
use points_ledger::seed;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::from(2);
        }
    };

    if config.input.extension().is_none_or(|ext| ext != "csv") {
        warn!(path = %config.input.display(), "input file seems to not be a csv file");
    }

    let service = LedgerService::new();
    if config.seed {
        if let Err(e) = seed::load_defaults(service.store()).await {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    }

    let commands = match read_commands(config.input.clone()) {
        Ok(commands) => commands,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let (command_sender, command_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if command_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    let session = Authenticated::new(config.actor);
    service
        .run(&session, ReceiverStream::new(command_receiver))
        .await;

    let balances = match service.get_balances(&session).await {
        Ok(balances) => balances,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = write_balances(io::stdout().lock(), &balances) {
        error!("{e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
