use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};

#[derive(Parser)]
#[command(name = "buttercup")]
#[command(version = "0.1.0")]
#[command(about = "Personalised life-soundtrack playlists, generated and saved to Spotify")]
pub struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(short, long, default_value_t = 5000)]
    pub port: u16,

    /// Print debug lines (request timings, upstream statuses)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    #[arg(long = "log-format", value_enum, default_value_t = OutputFormat::Text)]
    pub log_format: OutputFormat,
}

impl Cli {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Runtime logging configuration derived from CLI flags
#[derive(Clone, Debug, Default)]
pub struct LogConfig {
    pub verbose: bool,
    pub output_format: OutputFormat,
}

impl LogConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            verbose: cli.verbose,
            output_format: cli.log_format,
        }
    }
}
