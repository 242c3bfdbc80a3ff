//! calcd — runs the calcgrid calculator function.
//!
//! # Usage
//!
//! ```text
//! calcd serve --config calc.toml --bind 0.0.0.0:8080
//! calcd invoke '{"a":4,"b":5,"method":"ADD"}'
//! calcd config
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "calcd",
    about = "calcgrid — HTTP-triggered integer calculator",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to calc.toml. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the function over HTTP until Ctrl-C.
    Serve {
        /// Address to listen on (overrides [server].bind).
        #[arg(long)]
        bind: Option<String>,

        /// Reject request bodies larger than this (overrides [server].max_body_bytes).
        #[arg(long)]
        max_body_bytes: Option<usize>,

        /// Answer GET with a literal "GET" body.
        #[arg(long)]
        health_echo: bool,
    },
    /// Run a single invocation in-process and print the response.
    Invoke {
        /// HTTP method of the invocation.
        #[arg(short = 'X', long, default_value = "POST")]
        method: String,

        /// Request header as NAME=VALUE. May be repeated.
        #[arg(short = 'H', long = "header", value_parser = commands::invoke::parse_header)]
        headers: Vec<(String, String)>,

        /// Answer GET with a literal "GET" body.
        #[arg(long)]
        health_echo: bool,

        /// Request body.
        body: String,
    },
    /// Print the effective configuration as TOML.
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(config.log_filter()))?,
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve {
            bind,
            max_body_bytes,
            health_echo,
        } => {
            let mut config = config;
            if let Some(bind) = bind {
                config = config.with_bind(bind);
            }
            if let Some(limit) = max_body_bytes {
                config = config.with_max_body_bytes(limit);
            }
            if health_echo {
                config = config.with_health_echo(true);
            }
            commands::serve::serve(config)
        }
        Command::Invoke {
            method,
            headers,
            health_echo,
            body,
        } => {
            let config = if health_echo {
                config.with_health_echo(true)
            } else {
                config
            };
            commands::invoke::invoke(&config, &method, headers, &body)
        }
        Command::Config => commands::config::print(&config),
    }
}
