use crate::commands::cdtext::{CdtextCommands, DecodeCommand};
use crate::commands::ddp::{DdpCommands, InspectCommand};
use crate::commands::tool::{CallCommand, ToolCommands};
use crate::commands::{Cli, Commands};
use crate::ddp::DdpParser;
use crate::tool::DecodeRequest;
use anyhow::Result;
use clap::Parser;
use tokio::io::AsyncReadExt;

mod cdtext;
mod commands;
mod ddp;
mod tool;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cdtext(inner) => match inner {
            CdtextCommands::Decode(cmd) => decode_cdtext(cmd).await?,
        },
        Commands::Ddp(inner) => match inner {
            DdpCommands::Inspect(cmd) => inspect_ddp(cmd).await?,
        },
        Commands::Tool(inner) => match inner {
            ToolCommands::Schema => {
                println!("{}", serde_json::to_string_pretty(&tool::definition())?)
            }
            ToolCommands::Call(cmd) => run_tool_call(cmd).await?,
        },
    }

    Ok(())
}

async fn decode_cdtext(cmd: DecodeCommand) -> Result<()> {
    let data = tokio::fs::read(&cmd.input).await?;
    let parsed = if cmd.hex {
        cdtext::decode_hex(&String::from_utf8_lossy(&data))
    } else {
        cdtext::decode(&data)
    };
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    if cmd.raw_packs {
        let mut warnings = Vec::new();
        let buffer = if cmd.hex {
            cdtext::hexdump::normalize(&String::from_utf8_lossy(&data), &mut warnings)
        } else {
            data
        };
        let packs = cdtext::pack::read_packs(&buffer, &mut warnings);
        println!("{}", serde_json::to_string_pretty(&tool::pack_dump(&packs))?);
    }

    Ok(())
}

async fn inspect_ddp(cmd: InspectCommand) -> Result<()> {
    let parsed = DdpParser::new(&cmd.input).parse().await?;
    println!("{}", serde_json::to_string_pretty(&parsed)?);

    if cmd.offsets {
        let offsets = serde_json::json!({
            "trackOffsets": ddp::track_offsets(&parsed.pq_entries),
            "leadoutOffset": ddp::leadout_offset(&parsed.pq_entries),
        });
        println!("{}", serde_json::to_string_pretty(&offsets)?);
    }

    Ok(())
}

async fn run_tool_call(cmd: CallCommand) -> Result<()> {
    let raw = match cmd.request {
        Some(request) => request,
        None => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
    };
    let request: DecodeRequest = serde_json::from_str(&raw)?;
    println!("{}", serde_json::to_string_pretty(&tool::execute(&request))?);

    Ok(())
}
