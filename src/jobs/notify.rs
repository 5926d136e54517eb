// Graxil Proxy - Free and Open Source Software Statement
//
// This project, graxil-proxy, is Free and Open Source Software (FOSS) licensed
// under the MIT License. You are free to use, modify, and distribute this
// software in accordance with the license terms. Contributions are welcome
// via pull requests to the project repository.
//
// File: src/jobs/notify.rs
// Version: 1.0.0
// Developer: OIEIEIO <oieieio@protonmail.com>
//
// This file implements the clean-job notification that long-poll waiters
// subscribe to. Each fire releases every current subscriber at once and bumps
// the generation; later subscribers only see the next fire.
//
// Tree Location:
// - src/jobs/notify.rs (clean-job broadcast)
// - Depends on: tokio

use tokio::sync::broadcast::{self, Receiver, Sender, error::RecvError, error::TryRecvError};

const NOTIFY_CAPACITY: usize = 16;

/// Sent to waiters when the pool starts a new block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockChange {
    pub generation: u64,
    pub job_id: String,
    pub prev_hash: String,
}

/// Re-armed one-shot signal fired on every clean-jobs broadcast
#[derive(Debug)]
pub struct CleanJobNotifier {
    sender: Sender<BlockChange>,
    generation: u64,
}

impl CleanJobNotifier {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(NOTIFY_CAPACITY);
        Self { sender, generation: 0 }
    }

    /// Attach to the next fire
    pub fn subscribe(&self) -> CleanJobSubscription {
        CleanJobSubscription {
            receiver: Some(self.sender.subscribe()),
            generation: self.generation + 1,
        }
    }

    /// Release all current subscribers, returns how many were waiting
    pub fn fire(&mut self, job_id: &str, prev_hash: &str) -> usize {
        self.generation += 1;
        let event = BlockChange {
            generation: self.generation,
            job_id: job_id.to_string(),
            prev_hash: prev_hash.to_string(),
        };
        // no subscribers is not an error for us
        self.sender.send(event).unwrap_or(0)
    }

    /// Number of fires so far
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for CleanJobNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending wait on the next clean-jobs broadcast; drop it to unsubscribe
#[derive(Debug)]
pub struct CleanJobSubscription {
    // None once the signal has been taken
    receiver: Option<Receiver<BlockChange>>,
    generation: u64,
}

impl CleanJobSubscription {
    /// Generation this subscription will be released by
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Wait for the fire. Returns None if the registry was dropped first.
    pub async fn wait(self) -> Option<BlockChange> {
        let mut receiver = self.receiver?;
        loop {
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking check. Once the fire has been taken the subscription is
    /// spent and detached from later fires.
    pub fn try_take(&mut self) -> Option<BlockChange> {
        let receiver = self.receiver.as_mut()?;
        let outcome = loop {
            match receiver.try_recv() {
                Ok(event) => break Some(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => break None,
            }
        };
        self.receiver = None;
        outcome
    }

    /// True once the subscription has been released or closed
    pub fn is_spent(&self) -> bool {
        self.receiver.is_none()
    }
}


// Changelog:
// - v1.0.0 (2026-10-16): Initial clean-job broadcast.
//   - One broadcast channel, a generation counter and one-shot subscriptions.
//   - try_take drops the receiver after the first release.
