#[derive(clap::Args)]
pub struct InjectArgs {
    /// Path to a build definition in JSON
    ///
    /// `{"parameters": {...}, "features": [{"type": "awsrole", "parameters": {...}}]}`
    #[clap(long)]
    build: std::path::PathBuf,

    /// Output format; default to env
    ///
    /// - env: `KEY=value` lines for env.* parameters, prefix stripped
    /// - json: the whole resulting parameter set
    #[clap(value_enum, long, default_value = "env")]
    format: OutputFormat,
}

#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Env,
    Json,
}

impl OutputFormat {
    pub fn render(
        &self,
        params: &crate::host::BuildParameters,
    ) -> Result<String, crate::error::Error> {
        match *self {
            Self::Env => Ok(crate::inject::EnvironmentList::from_parameters(params).to_string()),
            Self::Json => {
                let mut json = serde_json::to_string_pretty(params)
                    .map_err(crate::error::Error::SerializationError)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

#[tokio::main]
pub async fn run(
    config: &crate::config::Config,
    args: &InjectArgs,
) -> Result<(), anyhow::Error> {
    let build = crate::host::BuildDefinition::load(&args.build).await?;
    let assumer = config.role_assumer().await?;

    let mut params = build.parameters.clone();
    crate::preprocessor::fix_run_build_parameters(&build, &assumer, &mut params).await?;

    let output = args.format.render(&params)?;
    {
        use std::io::Write;
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
    }
    Ok(())
}
