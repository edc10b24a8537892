#![deny(unsafe_code)]
pub mod commands;
mod version;

use anyhow::Result;
use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use enum_dispatch::enum_dispatch;
use env_logger::Env;
use log::info;

use commands::command::Command;
use commands::seq_hmm::SeqHmm;
use commands::seq_profile::SeqProfile;
use commands::view::View;

/// Custom styles for CLI help output
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Cyan.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(
    name = "flib",
    styles = STYLES,
    about = "Tools for creating and inspecting fragment libraries"
)]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[enum_dispatch(Command)]
#[derive(Parser, Debug)]
#[command(version)]
enum Subcommand {
    // Library construction
    #[command(display_order = 1)]
    SeqProfile(SeqProfile),
    #[command(display_order = 2)]
    SeqHmm(SeqHmm),

    // Utilities
    #[command(display_order = 3)]
    View(View),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Running flib version {}", version::VERSION.as_str());
    args.subcommand.execute()
}
