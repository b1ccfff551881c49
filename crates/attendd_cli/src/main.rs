//! attendd CLI
//!
//! Runs the terminal endpoint and inspects its data directory.
//!
//! # Commands
//!
//! - `serve` - Serve the terminal command endpoint
//! - `init` - Create the data directory and seed empty collections
//! - `inspect` - Display record counts and file sizes
//! - `dump-logs` - Print the tail of the attendance log

mod commands;

use attendd_server::{ServerConfig, DEFAULT_PORT};
use clap::{Parser, Subcommand};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Biometric attendance terminal server.
#[derive(Parser)]
#[command(name = "attendd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long, env = "DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the terminal command endpoint
    Serve {
        /// Address to listen on
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
        port: u16,

        /// TLS certificate (PEM); HTTPS is served when it and the key exist
        #[arg(long, env = "TLS_CERT", default_value = "certs/cert.pem")]
        tls_cert: PathBuf,

        /// TLS private key (PEM)
        #[arg(long, env = "TLS_KEY", default_value = "certs/key.pem")]
        tls_key: PathBuf,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = 10 * 1024 * 1024)]
        body_limit: usize,

        /// Number of entries returned by GET /logs
        #[arg(long, default_value_t = 100)]
        logs_tail: usize,

        /// Accepted QR codes (replaces the built-in list)
        #[arg(long = "qr-code", env = "QR_CODES", value_delimiter = ',')]
        qr_codes: Vec<String>,

        /// Serialize read-modify-write cycles per collection
        #[arg(long)]
        serialize_writes: bool,
    },

    /// Create the data directory and seed empty collections
    Init,

    /// Display record counts and file sizes
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the tail of the attendance log
    DumpLogs {
        /// Maximum number of entries to print
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG overrides the verbosity flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Serve {
            host,
            port,
            tls_cert,
            tls_key,
            body_limit,
            logs_tail,
            qr_codes,
            serialize_writes,
        } => {
            let mut config = ServerConfig::new(SocketAddr::new(host, port))
                .with_data_dir(&cli.data_dir)
                .with_tls(tls_cert, tls_key)
                .with_body_limit(body_limit)
                .with_logs_tail(logs_tail)
                .with_serialize_writes(serialize_writes);
            if !qr_codes.is_empty() {
                config = config.with_qr_allow_list(qr_codes);
            }
            commands::serve::run(config).await?;
        }
        Commands::Init => {
            commands::init::run(&cli.data_dir).await?;
        }
        Commands::Inspect { format } => {
            commands::inspect::run(&cli.data_dir, &format).await?;
        }
        Commands::DumpLogs { limit, format } => {
            commands::dump_logs::run(&cli.data_dir, limit, &format).await?;
        }
        Commands::Version => {
            println!("attendd v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
