//! flashweb - a web console for the flashrom utility
//!
//! `flashweb serve` hosts the browser console and relays each submitted
//! operation to flashrom on the server's host. `flashweb submit` drives the
//! same relay from a terminal, going through the same form, transport and
//! notification code the browser uses.

mod cli;
mod commands;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use log::LevelFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logger; -v and -vv override the default level
    logger(env_logger::Env::default().default_filter_or("info"), cli.verbose).init();

    match cli.command {
        Commands::Serve(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            let bind = args.bind;
            runtime.block_on(server::serve(server::ServerConfig::from(args), bind))
        }
        Commands::Submit(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::submit::run(args))
        }
        Commands::Fields => {
            commands::fields::print_fields();
            Ok(())
        }
    }
}

/// Level forced by `-v` (debug) or `-vv` (trace)
fn verbosity_level(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

fn logger(env: env_logger::Env<'_>, verbose: u8) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env);
    if let Some(level) = verbosity_level(verbose) {
        builder.filter_level(level);
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::{Level, Log, Metadata};

    fn enabled(verbose: u8, level: Level) -> bool {
        // Read filters from a variable nobody sets, so RUST_LOG does not leak in
        let env = env_logger::Env::new()
            .filter("FLASHWEB_TEST_LOG_UNSET")
            .default_filter_or("info");
        let logger = logger(env, verbose).build();
        logger.enabled(&Metadata::builder().level(level).target("flashweb_runner").build())
    }

    #[test]
    fn test_default_level_is_info() {
        assert!(enabled(0, Level::Info));
        assert!(!enabled(0, Level::Debug));
    }

    #[test]
    fn test_verbose_enables_debug() {
        assert!(enabled(1, Level::Debug));
        assert!(!enabled(1, Level::Trace));
    }

    #[test]
    fn test_very_verbose_enables_trace() {
        assert!(enabled(2, Level::Trace));
        assert!(enabled(5, Level::Trace));
    }
}
