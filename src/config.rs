#[derive(Debug, Clone)]
pub struct Config {
    user_agent: crate::user_agent::UserAgentSuffix,
    inner: ConfigData,
}

impl Config {
    pub fn new(inner: ConfigData) -> Result<Self, crate::error::Error> {
        if let Some(ref u) = inner.sts_endpoint {
            parse_sts_endpoint(u)?;
        }
        let user_agent = crate::user_agent::UserAgentSuffix::new(
            inner.plugin_version.as_deref().unwrap_or(DEFAULT_PLUGIN_VERSION),
            inner.server_url.as_deref(),
        );
        Ok(Self { user_agent, inner })
    }

    pub fn into_inner(self) -> ConfigData {
        self.inner
    }

    pub fn user_agent(&self) -> &crate::user_agent::UserAgentSuffix {
        &self.user_agent
    }

    pub fn sts_endpoint(&self) -> Result<Option<url::Url>, crate::error::Error> {
        self.inner
            .sts_endpoint
            .as_deref()
            .map(parse_sts_endpoint)
            .transpose()
    }

    /// Shared SDK configuration: the configured region, else the SDK region chain, else
    /// [`DEFAULT_REGION`]. Credentials, retries and timeouts are the SDK defaults.
    pub async fn sdk_config(&self) -> Result<aws_types::SdkConfig, crate::error::Error> {
        let region = aws_config::meta::region::RegionProviderChain::first_try(
            self.inner.region.clone().map(aws_types::region::Region::new),
        )
        .or_default_provider()
        .or_else(aws_types::region::Region::from_static(DEFAULT_REGION));

        let mut loader =
            aws_config::defaults(aws_config::BehaviorVersion::latest()).region(region);
        if let Some(endpoint) = self.sts_endpoint()? {
            loader = loader.endpoint_url(endpoint.as_str());
        }
        let sdk_config = loader.load().await;
        tracing::debug!(
            message = "Loaded AWS SDK configuration",
            region = ?sdk_config.region(),
            endpoint = ?sdk_config.endpoint_url(),
        );
        Ok(sdk_config)
    }

    pub async fn role_assumer(&self) -> Result<crate::assume::RoleAssumer, crate::error::Error> {
        Ok(crate::assume::RoleAssumer::new(
            self.sdk_config().await?,
            self.user_agent.clone(),
        ))
    }
}

impl std::ops::Deref for Config {
    type Target = ConfigData;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ConfigData {
    /// Base URL of the build server; its host goes into the user agent.
    pub server_url: Option<String>,
    pub plugin_version: Option<String>,
    pub region: Option<String>,
    pub sts_endpoint: Option<String>,
}

const DEFAULT_PLUGIN_VERSION: &str = env!("CARGO_PKG_VERSION");
/// Region of the global STS endpoint.
pub const DEFAULT_REGION: &str = "us-east-1";

fn parse_sts_endpoint(u: &str) -> Result<url::Url, crate::error::Error> {
    let url = url::Url::parse(u).map_err(|_| {
        crate::error::Error::ConfigError("sts endpoint (--sts-endpoint) is malformed".to_string())
    })?;
    match url.scheme() {
        "http" | "https" if url.host().is_some() => Ok(url),
        _ => Err(crate::error::Error::ConfigError(
            "sts endpoint (--sts-endpoint) must be an http(s) URL".to_string(),
        )),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_config_data() -> ConfigData {
        ConfigData {
            server_url: Some("https://ci.example.com:8111/".to_string()),
            plugin_version: Some("2.1.0".to_string()),
            region: Some("eu-west-1".to_string()),
            sts_endpoint: None,
        }
    }

    #[test]
    fn test_user_agent() {
        let config = Config::new(make_config_data()).unwrap();
        assert_eq!(
            config.user_agent().as_str(),
            "plugin/2.1.0 server/ci.example.com"
        );
        assert_eq!(config.server_url.as_deref(), Some("https://ci.example.com:8111/"));
    }

    #[tokio::test]
    async fn test_sdk_config_region() {
        let config = Config::new(make_config_data()).unwrap();
        let sdk_config = config.sdk_config().await.unwrap();
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("eu-west-1"));
        assert_eq!(sdk_config.endpoint_url(), None);
    }

    #[tokio::test]
    async fn test_sdk_config_endpoint_override() {
        let config = Config::new(ConfigData {
            sts_endpoint: Some("http://127.0.0.1:4566/".to_string()),
            ..make_config_data()
        })
        .unwrap();
        let sdk_config = config.sdk_config().await.unwrap();
        assert_eq!(sdk_config.endpoint_url(), Some("http://127.0.0.1:4566/"));
        assert_eq!(sdk_config.region().map(|r| r.as_ref()), Some("eu-west-1"));
    }

    #[test]
    fn test_malformed_sts_endpoint() {
        for endpoint in ["not a url", "file:///etc/passwd"] {
            let e = Config::new(ConfigData {
                sts_endpoint: Some(endpoint.to_string()),
                ..make_config_data()
            })
            .unwrap_err();
            assert_eq!(e.kind(), crate::error::ErrorKind::Configuration);
        }
    }
}
