//! Command Line Interface (CLI) arguments.

use clap::Parser;

/// Timeboard command line interface
#[derive(Clone, Debug, Parser)]
pub struct CommandLineArgs {
    /// The IP address on which the dashboard should listen
    #[arg(long, default_value = "0.0.0.0", env = "TIMEBOARD_HOST")]
    pub host: String,
    /// The port to which the dashboard should bind
    #[arg(long, default_value_t = 8080, env = "TIMEBOARD_PORT")]
    pub port: u16,
    /// Flag indicating whether HTTPS should be used
    #[arg(long, default_value_t = false, env = "TIMEBOARD_HTTPS")]
    pub https: bool,
    /// Path to the certificate file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/timeboard/certs/cert.pem",
        env = "TIMEBOARD_CERT_FILE"
    )]
    pub cert_file: String,
    /// Path to the key file to be used for HTTPS encryption
    #[arg(
        long,
        default_value = "~/.config/timeboard/certs/key.pem",
        env = "TIMEBOARD_KEY_FILE"
    )]
    pub key_file: String,
    /// Maximum time in seconds to wait for operations to complete upon receiving `ctrl+c` signal.
    #[arg(long, default_value_t = 60, env = "TIMEBOARD_SHUTDOWN_TIMEOUT")]
    pub graceful_shutdown_timeout: u64,
    /// Whether to enable sending traces to Jaeger.
    #[arg(long, default_value_t = false, env = "TIMEBOARD_ENABLE_JAEGER")]
    pub enable_jaeger: bool,
    /// Title shown on the landing page
    #[arg(long, default_value = "Timeboard", env = "TIMEBOARD_TITLE")]
    pub title: String,
    /// Route prefix the dashboard is mounted under, without a trailing slash
    #[arg(long, default_value = "", env = "TIMEBOARD_PREFIX")]
    pub prefix: String,
    /// Number of rows fetched from the store per chart page
    #[arg(long, default_value_t = 20_000, env = "TIMEBOARD_PAGE_LEN")]
    pub page_len: usize,
    /// Path to a JSON file of series data to serve
    #[arg(long, env = "TIMEBOARD_STORE_FILE")]
    pub store_file: Option<String>,
}

/// Returns parsed command line arguments.
pub fn parse() -> CommandLineArgs {
    CommandLineArgs::parse()
}
