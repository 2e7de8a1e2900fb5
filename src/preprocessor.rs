//! Runs before a build starts: assumes the role of every `awsrole` feature and exposes the
//! resulting credentials as build parameters.

/// Mutates `params` for a build about to run.
///
/// Features are processed one at a time in attachment order and a later feature overwrites
/// what an earlier one wrote. Writes are staged and only applied when every feature
/// succeeded, so on error `params` is unchanged.
pub async fn fix_run_build_parameters<B, A>(
    build: &B,
    assumer: &A,
    params: &mut crate::host::BuildParameters,
) -> Result<(), crate::error::Error>
where
    B: crate::host::RunningBuild + ?Sized,
    A: crate::assume::AssumeRole + ?Sized,
{
    use tracing::Instrument;

    let features = build.build_features_of_type(crate::feature::FEATURE_TYPE);
    if features.is_empty() {
        return Ok(());
    }
    if features.len() > 1 {
        tracing::warn!(
            message = "multiple awsrole features attached; credentials of the last one win",
            count = features.len(),
        );
    }

    let mut staged = params.clone();
    for (index, feature) in features.into_iter().enumerate() {
        let span = tracing::info_span!("awsrole_feature", index, id = ?feature.id);
        process_feature(build, assumer, feature, &mut staged)
            .instrument(span)
            .await
            .map_err(|e| {
                tracing::error!(
                    message = "failed to inject AWS role credentials",
                    index,
                    id = ?feature.id,
                    kind = ?e.kind(),
                    error = %e,
                );
                e
            })?;
    }
    *params = staged;
    Ok(())
}

async fn process_feature<B, A>(
    build: &B,
    assumer: &A,
    feature: &crate::host::FeatureDescriptor,
    params: &mut crate::host::BuildParameters,
) -> Result<(), crate::error::Error>
where
    B: crate::host::RunningBuild + ?Sized,
    A: crate::assume::AssumeRole + ?Sized,
{
    let resolved = build.resolve(&feature.parameters);
    let config = crate::feature::RoleRequestConfig::from_parameters(&resolved)?;
    let authenticator = crate::credentials::select(&config);
    let assumed = assumer.assume_role(&config, &authenticator).await?;
    crate::inject::put_environment_variables(params, &assumed.credentials, &assumed.tags)
}
