//! Weighbridge operator console.
//!
//! Holds the edit lease of one truck process at a time and keeps it renewed
//! while the operator works. Interrupting the console or closing its input
//! gives the lease back.

#![forbid(unsafe_code)]

mod console;
mod operator_config;

use std::env;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use weighbridge_application::{
    LeaseFactory, LeaseSlot, LockGateway, ProcessLease, ReleaseBeacon, ReleasePath,
};
use weighbridge_core::{AppError, AppResult};
use weighbridge_infrastructure::{HttpLockTransport, HttpReleaseBeacon};

use crate::console::{ConsoleCommand, HELP, TerminalNotifier, render_status};
use crate::operator_config::{OperatorConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = OperatorConfig::load()?;
    let lock_config = config.lock_client_config()?;
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_millis(config.http_timeout_ms))
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let transport = HttpLockTransport::new(
        http_client.clone(),
        config.api_base_url.clone(),
        config.access_token.provider(),
    );
    let release_beacon: Arc<dyn ReleaseBeacon> = Arc::new(HttpReleaseBeacon::new(
        http_client,
        config.api_base_url.clone(),
    ));
    let factory = LeaseFactory::new(
        LockGateway::new(Arc::new(transport)),
        Some(release_beacon),
        lock_config,
    );
    let mut slot = LeaseSlot::new(factory);

    info!(
        api_base_url = %config.api_base_url,
        heartbeat_interval_ms = config.heartbeat_interval_ms,
        fast_release = lock_config.fast_release().allows_beacon(),
        "weighbridge-operator started"
    );

    let initial_candidate = env::args().nth(1);
    let lease = slot
        .select(initial_candidate.as_deref(), unload_signal())
        .await;
    if lease.process_id().is_some() {
        lease.ensure_lock_or_explain(&TerminalNotifier).await;
    } else {
        warn!(
            candidate = %lease.candidate(),
            "no valid process selected, lock commands stay inactive"
        );
    }
    println!("{}", render_status(&lease));

    let console_result = run_console(&mut slot).await;
    slot.clear().await;
    info!("weighbridge-operator stopped");

    console_result
}

fn unload_signal() -> impl Future<Output = ()> + Send + 'static {
    async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

async fn run_console(slot: &mut LeaseSlot) -> AppResult<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.map_err(|error| {
                AppError::Internal(format!("failed to read console input: {error}"))
            })?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupt received");
                return Ok(());
            }
        };
        let Some(line) = line else {
            return Ok(());
        };

        match line.parse::<ConsoleCommand>() {
            Ok(ConsoleCommand::Quit) => return Ok(()),
            Ok(command) => apply(slot, command).await,
            Err(error) => eprintln!("{error}"),
        }
    }
}

async fn apply(slot: &mut LeaseSlot, command: ConsoleCommand) {
    let lease = match command {
        ConsoleCommand::Help => {
            println!("{HELP}");
            return;
        }
        ConsoleCommand::Select(candidate) => {
            let lease = slot.select(Some(candidate.as_str()), unload_signal()).await;
            lease.resume().await;
            lease
        }
        command => {
            let Some(lease) = slot.current().cloned() else {
                eprintln!("no process selected");
                return;
            };
            run_lease_command(&lease, command).await;
            lease
        }
    };

    println!("{}", render_status(&lease));
}

async fn run_lease_command(lease: &ProcessLease, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Acquire => {
            lease.acquire().await;
        }
        ConsoleCommand::Ensure => {
            lease.ensure_lock_or_explain(&TerminalNotifier).await;
        }
        ConsoleCommand::Pause => lease.pause(),
        ConsoleCommand::Resume => {
            lease.resume().await;
        }
        ConsoleCommand::Release => {
            lease.release(ReleasePath::KeepAlive).await;
        }
        ConsoleCommand::ReleaseFast => {
            lease.release(ReleasePath::Beacon).await;
        }
        ConsoleCommand::Status
        | ConsoleCommand::Select(_)
        | ConsoleCommand::Help
        | ConsoleCommand::Quit => {}
    }
}
