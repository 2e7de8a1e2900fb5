#[derive(clap::Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(flatten)]
    config: ConfigArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); $RUST_LOG takes precedence
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u64,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// Base URL of the build server; its host is reported in the User-Agent
    #[clap(long, global = true, env = "AWSROLE_SERVER_URL")]
    server_url: Option<String>,
    /// Version of the build server integration, reported in the User-Agent
    #[clap(long, global = true, env = "AWSROLE_PLUGIN_VERSION")]
    plugin_version: Option<String>,
    /// AWS region for STS; falls back to the SDK region chain (profile, IMDS), then us-east-1
    #[clap(long, global = true, env = "AWS_REGION")]
    region: Option<String>,
    /// Override the STS endpoint URL
    #[clap(long, global = true, env = "AWSROLE_STS_ENDPOINT")]
    sts_endpoint: Option<String>,
}

impl From<ConfigArgs> for awsrole::config::ConfigData {
    fn from(args: ConfigArgs) -> Self {
        Self {
            server_url: args.server_url,
            plugin_version: args.plugin_version,
            region: args.region,
            sts_endpoint: args.sts_endpoint,
        }
    }
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Assume the role of every awsrole feature in a build and print the resulting parameters
    Inject(awsrole::cmd::inject::InjectArgs),
    /// Validate awsrole features of a build without calling AWS
    Check(awsrole::cmd::check::CheckArgs),
}

fn main() -> Result<(), anyhow::Error> {
    use clap::Parser;
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config = awsrole::config::Config::new(cli.config.into())?;
    match cli.command {
        Commands::Inject(ref args) => awsrole::cmd::inject::run(&config, args),
        Commands::Check(ref args) => awsrole::cmd::check::run(args),
    }
}

fn init_logging(verbose: u64) -> Result<(), anyhow::Error> {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    // stdout carries the command output
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
