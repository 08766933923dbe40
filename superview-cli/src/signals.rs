//! Interrupt handling.
//!
//! A background thread runs a small tokio runtime that waits for Ctrl+C (and
//! SIGTERM on unix) and cancels the shared token. The encode loop notices the
//! token, stops ffmpeg and returns `Cancelled`, so the program exits through
//! its normal error path instead of being torn down by the signal.

use std::thread;

use anyhow::{Context, Result};
use superview_core::CancellationToken;

/// Spawns the watcher thread. It lives until the process exits.
pub fn spawn_interrupt_watcher(cancel: CancellationToken) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build signal runtime")?;

    thread::Builder::new()
        .name("signal-watcher".to_string())
        .spawn(move || {
            runtime.block_on(async {
                match wait_for_interrupt().await {
                    Ok(name) => {
                        log::warn!("Received {}, cancelling encode", name);
                        cancel.cancel();
                    }
                    Err(e) => log::error!("Signal handler failed: {}", e),
                }
            });
        })
        .context("Failed to spawn signal watcher")?;
    Ok(())
}

#[cfg(unix)]
async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.map(|_| "Ctrl+C"),
        _ = terminate.recv() => Ok("SIGTERM"),
    }
}

#[cfg(not(unix))]
async fn wait_for_interrupt() -> std::io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl+C")
}
