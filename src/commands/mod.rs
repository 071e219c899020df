use crate::commands::cdtext::CdtextCommands;
use crate::commands::ddp::DdpCommands;
use crate::commands::tool::ToolCommands;
use clap::{Parser, Subcommand};

pub mod cdtext;
pub mod ddp;
pub mod tool;

/// CLI for decoding CD-TEXT data and inspecting DDP disc masters.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(subcommand)]
    Cdtext(CdtextCommands),
    #[command(subcommand)]
    Ddp(DdpCommands),
    #[command(subcommand)]
    Tool(ToolCommands),
}
