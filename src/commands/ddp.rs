use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Commands specific to DDP disc master folders
#[derive(Subcommand, Debug)]
pub enum DdpCommands {
    Inspect(InspectCommand),
}

/// Parses a DDP folder (DDPMS, DDPID, PQ descriptor, CDTEXT.BIN) into a
/// combined track listing.
#[derive(Parser, Debug, Clone)]
pub struct InspectCommand {
    /// Path to the DDP folder
    #[arg(value_name = "INPUT_DIR")]
    pub input: PathBuf,

    /// Also print the lead-in adjusted disc-id frame offsets
    #[arg(long, short = 'o', default_value_t = false)]
    pub offsets: bool,
}
