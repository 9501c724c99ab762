//! Command-line and environment argument parsing

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "ecr-credential-sync")]
#[command(about = "Keeps Cattle registry credentials in sync with AWS ECR authorization tokens")]
#[command(version)]
pub struct Args {
    /// Cattle API URL
    #[arg(
        long = "cattle-url",
        env = "CATTLE_URL",
        help = "Cattle API base URL, e.g. http://rancher:8080/v2-beta"
    )]
    pub cattle_url: String,

    #[arg(
        long = "cattle-access-key",
        env = "CATTLE_ACCESS_KEY",
        hide_env_values = true,
        help = "Cattle API access key"
    )]
    pub cattle_access_key: String,

    #[arg(
        long = "cattle-secret-key",
        env = "CATTLE_SECRET_KEY",
        hide_env_values = true,
        help = "Cattle API secret key"
    )]
    pub cattle_secret_key: String,

    /// ECR registry (account) ids to request tokens for
    #[arg(
        long = "registry-ids",
        env = "AWS_ECR_REGISTRY_IDS",
        value_delimiter = ',',
        help = "Comma-separated ECR registry ids; empty requests the default account"
    )]
    pub registry_ids: Vec<String>,

    #[arg(
        long = "auto-create",
        env = "AUTO_CREATE",
        action = clap::ArgAction::Set,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = clap::builder::BoolishValueParser::new(),
        help = "Create a registry and credential when no registry matches"
    )]
    pub auto_create: bool,

    #[arg(
        long = "host-override",
        env = "ECR_HOST_OVERRIDE",
        help = "Match registries against this host instead of the ECR endpoint host"
    )]
    pub host_override: Option<String>,

    #[arg(
        long = "listen-port",
        env = "LISTEN_PORT",
        default_value = "8080",
        help = "Port for the /ping health check"
    )]
    pub listen_port: u16,

    #[arg(
        long = "log-level",
        env = "LOG_LEVEL",
        default_value = "info",
        help = "Log verbosity: trace, debug, info, warn, error"
    )]
    pub log_level: String,

    /// Verbose output
    #[arg(long = "verbose", short = 'v', help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long = "refresh-interval-hours",
        env = "REFRESH_INTERVAL_HOURS",
        default_value = "6",
        help = "Hours between reconciliation passes"
    )]
    pub refresh_interval_hours: u64,

    #[arg(
        long = "request-timeout",
        env = "REQUEST_TIMEOUT_SECS",
        default_value = "60",
        help = "Timeout in seconds for each Cattle API request"
    )]
    pub request_timeout: u64,

    #[arg(long = "once", help = "Run a single reconciliation pass and exit")]
    pub once: bool,
}
