#[derive(clap::Args)]
pub struct CheckArgs {
    /// Path to a build definition in JSON
    #[clap(long)]
    build: std::path::PathBuf,
}

/// What a feature would request, with secrets left out.
#[derive(Debug, PartialEq, Eq, serde::Serialize)]
pub struct FeatureSummary {
    pub index: usize,
    pub id: Option<String>,
    pub role_arn: String,
    pub session_name: String,
    pub session_duration_seconds: i32,
    pub external_id: bool,
    pub authentication: String,
    pub tags: std::collections::BTreeMap<String, String>,
}

/// Resolves and validates every `awsrole` feature of `build` without calling AWS.
pub fn summarize<B: crate::host::RunningBuild + ?Sized>(
    build: &B,
) -> Result<Vec<FeatureSummary>, crate::error::Error> {
    build
        .build_features_of_type(crate::feature::FEATURE_TYPE)
        .into_iter()
        .enumerate()
        .map(|(index, feature)| {
            let resolved = build.resolve(&feature.parameters);
            let config = crate::feature::RoleRequestConfig::from_parameters(&resolved).map_err(
                |e| {
                    crate::error::Error::ConfigError(format!(
                        "feature #{index} ({}): {e}",
                        feature.id.as_deref().unwrap_or("unnamed")
                    ))
                },
            )?;
            let authentication = match crate::credentials::select(&config) {
                crate::credentials::Authenticator::Static(c) => {
                    format!("static ({})", c.access_key_id)
                }
                crate::credentials::Authenticator::Ambient => "ambient".to_string(),
            };
            Ok(FeatureSummary {
                index,
                id: feature.id.clone(),
                role_arn: config.role_arn,
                session_name: config.session_name,
                session_duration_seconds: config.session_duration_seconds,
                external_id: config.external_id.is_some(),
                authentication,
                tags: config.tags.into_iter().map(|t| (t.key, t.value)).collect(),
            })
        })
        .collect()
}

#[tokio::main]
pub async fn run(args: &CheckArgs) -> Result<(), anyhow::Error> {
    let build = crate::host::BuildDefinition::load(&args.build).await?;
    let summaries = summarize(&build)?;
    if summaries.is_empty() {
        tracing::warn!(
            message = "no awsrole feature attached to the build",
            build = %args.build.display()
        );
    }
    serde_json::to_writer_pretty(std::io::stdout(), &summaries)?;
    println!();
    Ok(())
}
