use clap::{ArgAction, Args};
use msgpack_d::SimdPolicy;

/// Global arguments that apply to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Vector width limit: auto, scalar, 128, 256 or 512 (overrides config)
    #[arg(long, global = true, value_name = "WIDTH", value_parser = parse_policy)]
    pub simd: Option<SimdPolicy>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Default log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn parse_policy(s: &str) -> Result<SimdPolicy, String> {
    s.parse().map_err(|e: msgpack_d::ConfigError| e.to_string())
}
