//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flashweb")]
#[command(author, version, about = "Web console for the flashrom utility", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Operation selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Detect the flash chip
    Probe,
    /// Erase the chip
    Erase,
    /// Read the chip into a file
    Read,
    /// Write an image to the chip
    Write,
    /// Compare the chip against an image
    Verify,
}

impl From<ActionArg> for flashweb_core::Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Probe => Self::Probe,
            ActionArg::Erase => Self::Erase,
            ActionArg::Read => Self::Read,
            ActionArg::Write => Self::Write,
            ActionArg::Verify => Self::Verify,
        }
    }
}

/// Options for the relay server
#[derive(clap::Args, Debug, Clone)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "FLASHWEB_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Directory uploaded images are staged in
    #[arg(long, env = "FLASHWEB_INPUT_DIR", default_value = "webui/inputs")]
    pub input_dir: PathBuf,

    /// Directory chip dumps are written to and served from
    #[arg(long, env = "FLASHWEB_OUTPUT_DIR", default_value = "webui/outputs")]
    pub output_dir: PathBuf,

    /// Directory holding the compiled web front-end (served under /pkg)
    #[arg(long, env = "FLASHWEB_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// flashrom executable
    #[arg(long, env = "FLASHWEB_FLASHROM", default_value = "flashrom")]
    pub flashrom: PathBuf,

    /// Extra argument placed before the generated flashrom arguments
    /// (repeatable, e.g. to run through a wrapper)
    #[arg(long = "flashrom-arg", allow_hyphen_values = true)]
    pub flashrom_args: Vec<String>,

    /// Largest accepted upload in MiB
    #[arg(long, default_value_t = 64)]
    pub max_upload_mib: usize,
}

/// Options for a one-shot submission
#[derive(clap::Args, Debug, Clone)]
pub struct SubmitArgs {
    /// Base URL of a running console
    #[arg(long, env = "FLASHWEB_URL", default_value = "http://127.0.0.1:8080/")]
    pub url: String,

    /// Programmer string passed to flashrom -p (e.g. ch341a_spi)
    #[arg(short, long)]
    pub programmer: String,

    /// Operation to perform
    #[arg(short, long, value_enum, default_value_t = ActionArg::Probe)]
    pub action: ActionArg,

    /// Image to upload (write, verify)
    #[arg(short = 'i', long)]
    pub file: Option<PathBuf>,

    /// Force the operation
    #[arg(long)]
    pub force: bool,

    /// Request maximum flashrom verbosity
    #[arg(long = "very-very-verbose")]
    pub very_very_verbose: bool,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Save a produced chip dump to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the console and relay operations to flashrom
    Serve(ServeArgs),

    /// Submit one operation to a running console
    Submit(SubmitArgs),

    /// Show which optional fields apply to each action
    Fields,
}
