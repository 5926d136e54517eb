// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/hook.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file runs the operator's blocknotify-compatible command when the pool
// switches to a new block. The command runs in the background and its exit
// status is only logged.
//
// Tree Location:
// - src/jobs/hook.rs (block change command hook)
// - Depends on: tokio, log

use log::{debug, info, warn};

const LOG_TARGET: &str = "graxil::proxy::hook";

/// Command template with a `%s` placeholder for the new previous block hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNotifyCommand {
    template: String,
}

impl BlockNotifyCommand {
    pub fn new(template: impl Into<String>) -> Self {
        Self { template: template.into() }
    }

    pub fn render(&self, prev_hash: &str) -> String {
        self.template.replace("%s", prev_hash)
    }

    /// Start the command without waiting for it
    pub fn spawn(&self, prev_hash: &str) {
        let command = self.render(prev_hash);
        info!(target: LOG_TARGET, "Running blocknotify command: {}", command);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(run_command(command));
            }
            Err(_) => {
                let spawned = std::thread::Builder::new()
                    .name("blocknotify".to_string())
                    .spawn(move || run_command_blocking(command));
                if let Err(e) = spawned {
                    warn!(target: LOG_TARGET, "Failed to start blocknotify thread: {}", e);
                }
            }
        }
    }
}

async fn run_command(command: String) {
    match tokio::process::Command::new("sh").arg("-c").arg(&command).status().await {
        Ok(status) => debug!(target: LOG_TARGET, "Blocknotify command finished: {}", status),
        Err(e) => warn!(target: LOG_TARGET, "Failed to run blocknotify command '{}': {}", command, e),
    }
}

fn run_command_blocking(command: String) {
    match std::process::Command::new("sh").arg("-c").arg(&command).status() {
        Ok(status) => debug!(target: LOG_TARGET, "Blocknotify command finished: {}", status),
        Err(e) => warn!(target: LOG_TARGET, "Failed to run blocknotify command '{}': {}", command, e),
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Initial blocknotify hook.
//   - Runs on the tokio runtime when one is present, otherwise on a thread.
