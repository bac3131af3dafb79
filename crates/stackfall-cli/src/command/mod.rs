use clap::{Parser, Subcommand};

use self::play::{AutoPlayArg, PlayArg};

mod play;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in (defaults to auto-play)
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play with the keyboard only
    #[command(name = "play")]
    ManualPlay(#[clap(flatten)] PlayArg),
    /// Play with the keyboard while the assistant places pieces
    #[command(name = "auto-play")]
    AutoPlay(#[clap(flatten)] AutoPlayArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args
        .mode
        .unwrap_or_else(|| Mode::AutoPlay(AutoPlayArg::default()))
    {
        Mode::ManualPlay(arg) => play::run_manual(&arg)?,
        Mode::AutoPlay(arg) => play::run_auto(&arg)?,
    }
    Ok(())
}
