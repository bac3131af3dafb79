use std::{
    sync::mpsc::{self, RecvError, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use stackfall_engine::SessionSnapshot;

use crate::{Assistant, PlacementProposal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantConfig {
    /// How often the worker looks at the latest snapshot.
    pub poll_interval: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
        }
    }
}

#[derive(Debug)]
enum Command {
    Observe(SessionSnapshot),
    Pause,
    Resume,
    Stop,
}

/// Owner side of the background assistant.
///
/// The game thread publishes snapshots with [`Self::observe`] and drains
/// proposals with [`Self::try_recv_proposal`]; the worker never sees the live
/// session. While paused the worker blocks on its command channel.
///
/// Dropping the handle stops and joins the worker.
#[derive(Debug)]
pub struct AssistantHandle {
    commands: mpsc::Sender<Command>,
    proposals: mpsc::Receiver<PlacementProposal>,
    worker: Option<JoinHandle<()>>,
}

impl AssistantHandle {
    /// Starts the worker thread.
    #[must_use]
    pub fn spawn(config: AssistantConfig) -> Self {
        let (tx_command, rx_command) = mpsc::channel();
        let (tx_proposal, rx_proposal) = mpsc::channel();
        let worker = thread::spawn(move || assistant_thread(config, &rx_command, &tx_proposal));
        Self {
            commands: tx_command,
            proposals: rx_proposal,
            worker: Some(worker),
        }
    }

    /// Replaces the snapshot the worker plans from.
    pub fn observe(&self, snapshot: SessionSnapshot) {
        self.send(Command::Observe(snapshot));
    }

    pub fn pause(&self) {
        self.send(Command::Pause);
    }

    pub fn resume(&self) {
        self.send(Command::Resume);
    }

    /// Returns a pending proposal without blocking.
    #[must_use]
    pub fn try_recv_proposal(&self) -> Option<PlacementProposal> {
        self.proposals.try_recv().ok()
    }

    /// Waits up to `timeout` for the next proposal.
    #[cfg(test)]
    fn recv_proposal_timeout(&self, timeout: Duration) -> Option<PlacementProposal> {
        self.proposals.recv_timeout(timeout).ok()
    }

    /// Stops the worker and waits for it to exit. Later calls do nothing.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.send(Command::Stop);
        // A panicked worker has nothing left to clean up.
        let _ = worker.join();
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.worker.is_none()
    }

    fn send(&self, command: Command) {
        // The worker only goes away after Stop, so a failed send needs no handling.
        let _ = self.commands.send(command);
    }
}

impl Drop for AssistantHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn assistant_thread(
    config: AssistantConfig,
    rx: &mpsc::Receiver<Command>,
    tx: &mpsc::Sender<PlacementProposal>,
) {
    let mut assistant = Assistant::new();
    let mut latest = None;
    let mut paused = false;
    let mut next_poll = Instant::now() + config.poll_interval;

    loop {
        let command = if paused {
            match rx.recv() {
                Ok(command) => command,
                Err(RecvError) => return,
            }
        } else {
            let now = Instant::now();
            if now >= next_poll {
                next_poll = now + config.poll_interval;
                if let Some(snapshot) = &latest
                    && let Some(proposal) = assistant.propose(snapshot)
                    && tx.send(proposal).is_err()
                {
                    return;
                }
                continue;
            }
            match rx.recv_timeout(next_poll - now) {
                Ok(command) => command,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return,
            }
        };

        match command {
            Command::Observe(snapshot) => latest = Some(snapshot),
            Command::Pause => paused = true,
            Command::Resume => paused = false,
            Command::Stop => return,
        }
    }
}
