//! Writes assumed role credentials into build parameters.

pub const ENV_PREFIX: &str = "env.";

pub const AWS_ACCESS_KEY_ID: &str = "env.AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY: &str = "env.AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN: &str = "env.AWS_SESSION_TOKEN";
pub const AWS_ROLE_TAGS: &str = "env.AWS_ROLE_TAGS";

/// Renders session tags as a JSON object string, e.g. `{"project":"foo","team":"bar"}`.
pub fn render_tags(tags: &[crate::feature::Tag]) -> Result<String, crate::error::Error> {
    let map: std::collections::BTreeMap<&str, &str> = tags
        .iter()
        .map(|t| (t.key.as_str(), t.value.as_str()))
        .collect();
    serde_json::to_string(&map).map_err(crate::error::Error::SerializationError)
}

/// Inserts or overwrites the credential and tag parameters. The tag map is encoded before
/// anything is written, so on error `params` is left as it was.
pub fn put_environment_variables(
    params: &mut crate::host::BuildParameters,
    credentials: &crate::credentials::TemporaryCredentials,
    tags: &[crate::feature::Tag],
) -> Result<(), crate::error::Error> {
    use secrecy::ExposeSecret;

    let tags_json = render_tags(tags)?;

    params.insert(
        AWS_ACCESS_KEY_ID.to_string(),
        credentials.access_key_id.clone(),
    );
    params.insert(
        AWS_SECRET_ACCESS_KEY.to_string(),
        credentials.secret_access_key.expose_secret().clone(),
    );
    params.insert(
        AWS_SESSION_TOKEN.to_string(),
        credentials.session_token.expose_secret().clone(),
    );
    params.insert(AWS_ROLE_TAGS.to_string(), tags_json);
    Ok(())
}

type EnvironmentListInner = Vec<(String, String)>;

/// `env.*` build parameters as environment variables, sorted by name.
pub struct EnvironmentList {
    inner: EnvironmentListInner,
}

impl EnvironmentList {
    pub fn from_parameters(params: &crate::host::BuildParameters) -> Self {
        params
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix(ENV_PREFIX)
                    .filter(|name| !name.is_empty())
                    .map(|name| (name.to_owned(), v.clone()))
            })
            .collect::<EnvironmentListInner>()
            .into()
    }

    pub fn into_inner(self) -> EnvironmentListInner {
        self.inner
    }
}

impl std::fmt::Display for EnvironmentList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        for (k, v) in self.inner.iter() {
            writeln!(f, "{k}={v}")?;
        }
        Ok(())
    }
}

impl std::ops::Deref for EnvironmentList {
    type Target = EnvironmentListInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<EnvironmentListInner> for EnvironmentList {
    fn from(mut inner: EnvironmentListInner) -> Self {
        inner.sort_by(|a, b| a.0.cmp(&b.0));
        Self { inner }
    }
}
