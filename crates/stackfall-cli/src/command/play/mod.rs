use std::{io, time::Duration};

use stackfall_assistant::{AssistantConfig, PlacementDiagnostic};
use stackfall_engine::{GameSession, PieceSeed};

use crate::{command::play::app::PlayApp, tui::Tui};

mod app;

pub(crate) const DEFAULT_GRAVITY_MS: u64 = 500;
pub(crate) const DEFAULT_ASSIST_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Milliseconds between gravity steps
    #[clap(long, default_value_t = DEFAULT_GRAVITY_MS)]
    pub(super) gravity_ms: u64,
    /// Seed for the piece sequence, as 32 hex digits (random if omitted)
    #[clap(long)]
    pub(super) seed: Option<PieceSeed>,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self {
            gravity_ms: DEFAULT_GRAVITY_MS,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct AutoPlayArg {
    #[clap(flatten)]
    pub(super) play: PlayArg,
    /// Milliseconds between assistant polls
    #[clap(long, default_value_t = DEFAULT_ASSIST_INTERVAL_MS)]
    pub(super) assist_interval_ms: u64,
}

impl Default for AutoPlayArg {
    fn default() -> Self {
        Self {
            play: PlayArg::default(),
            assist_interval_ms: DEFAULT_ASSIST_INTERVAL_MS,
        }
    }
}

impl PlayArg {
    fn session(&self) -> GameSession {
        self.seed.map_or_else(GameSession::new, GameSession::with_seed)
    }

    fn gravity_interval(&self) -> Duration {
        Duration::from_millis(self.gravity_ms.max(1))
    }
}

pub(crate) fn run_manual(arg: &PlayArg) -> anyhow::Result<()> {
    let mut tui = Tui::new();
    let mut app = PlayApp::manual(&mut tui, arg.session(), arg.gravity_interval());
    tui.run(&mut app)?;
    report_diagnostics(app.diagnostics())
}

pub(crate) fn run_auto(arg: &AutoPlayArg) -> anyhow::Result<()> {
    let AutoPlayArg {
        play,
        assist_interval_ms,
    } = arg;

    let config = AssistantConfig {
        poll_interval: Duration::from_millis(*assist_interval_ms),
    };
    let mut tui = Tui::new();
    let mut app = PlayApp::auto(&mut tui, play.session(), play.gravity_interval(), config);
    tui.run(&mut app)?;
    report_diagnostics(app.diagnostics())
}

/// Dumps rejected assistant placements to stderr once the terminal is restored.
fn report_diagnostics(diagnostics: &[PlacementDiagnostic]) -> anyhow::Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    eprintln!("{} assistant placement(s) were rejected:", diagnostics.len());
    serde_json::to_writer_pretty(io::stderr().lock(), diagnostics)?;
    eprintln!();
    Ok(())
}
