use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Commands specific to CD-TEXT binary data
#[derive(Subcommand, Debug)]
pub enum CdtextCommands {
    Decode(DecodeCommand),
}

/// Decodes a CDTEXT.BIN file (or a hex dump of one) into structured JSON.
#[derive(Parser, Debug, Clone)]
pub struct DecodeCommand {
    /// Input CDTEXT.BIN file path
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Treat the input file as a hex dump instead of raw binary
    #[arg(long, short = 'x', default_value_t = false)]
    pub hex: bool,

    /// Also print the raw pack dump
    #[arg(long, default_value_t = false)]
    pub raw_packs: bool,
}
