use clap::Parser;
use tracing::Level;

use crate::options::Options;

#[allow(clippy::upper_case_acronyms)]
#[derive(Parser)]
#[command(
    name = "janus",
    version,
    about = "Janus serves the Ethereum JSON-RPC API on top of a Qtum node"
)]
pub struct CLI {
    #[arg(
        long = "log.level",
        default_value_t = Level::INFO,
        value_name = "LOG_LEVEL",
        help = "The verbosity level used for logs.",
        long_help = "Possible values: info, debug, trace, warn, error",
        help_heading = "Node options"
    )]
    pub log_level: Level,
    #[command(flatten)]
    pub opts: Options,
}
