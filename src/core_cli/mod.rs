use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ferroftpd", about = "A minimal FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "")]
    pub config: String,

    /// Refuse all mutating commands regardless of configuration
    #[arg(short, long)]
    pub readonly: bool,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}
