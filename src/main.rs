//! `mathwalk`: animated step-by-step math walkthroughs

use clap::Parser;
use tokio_util::sync::CancellationToken;

use mathwalk::cli::args::Cli;
use mathwalk::cli::commands;
use mathwalk::error::ExitCode;
use mathwalk::observability::init_logging;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();

    // First signal stops playback; a second one exits immediately.
    tokio::spawn(async move {
        let Some(first) = wait_for_signal().await else {
            return;
        };
        eprintln!("\nStopping walkthrough... (press Ctrl+C again to force)");
        shutdown.cancel();
        let second = wait_for_signal().await;
        std::process::exit(second.unwrap_or(first));
    });

    let result = commands::dispatch(cli, cancel.clone()).await;

    match result {
        Ok(()) if cancel.is_cancelled() => std::process::exit(ExitCode::INTERRUPTED),
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Waits for SIGINT or SIGTERM and returns the matching exit code.
#[cfg(unix)]
async fn wait_for_signal() -> Option<i32> {
    use tokio::signal::unix::{SignalKind, signal};

    let Ok(mut sigterm) = signal(SignalKind::terminate()) else {
        tracing::warn!("failed to register SIGTERM handler");
        return tokio::signal::ctrl_c()
            .await
            .ok()
            .map(|()| ExitCode::INTERRUPTED);
    };

    tokio::select! {
        res = tokio::signal::ctrl_c() => res.ok().map(|()| ExitCode::INTERRUPTED),
        _ = sigterm.recv() => Some(ExitCode::TERMINATED),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Option<i32> {
    tokio::signal::ctrl_c()
        .await
        .ok()
        .map(|()| ExitCode::INTERRUPTED)
}
