//! Client identification appended to every outgoing call.

use aws_smithy_runtime_api::client::interceptors::context::BeforeTransmitInterceptorContextMut;

const APP_NAME: &str = env!("CARGO_PKG_NAME");
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// `plugin/<version> server/<host>`; computed once per process and shared read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserAgentSuffix(String);

impl UserAgentSuffix {
    /// The `server/<host>` part is left out when `server_url` is missing or has no host.
    pub fn new(plugin_version: &str, server_url: Option<&str>) -> Self {
        let mut suffix = format!("plugin/{plugin_version}");
        if let Some(host) = server_url
            .and_then(|u| url::Url::parse(u).ok())
            .and_then(|u| u.host_str().map(|h| h.to_owned()))
        {
            suffix.push_str(" server/");
            suffix.push_str(&host);
        }
        Self(suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// What gets appended to the SDK's own `user-agent` value.
    pub fn header_suffix(&self) -> String {
        format!("{APP_NAME}/{APP_VERSION} {}", self.0)
    }

    pub fn interceptor(&self) -> UserAgentInterceptor {
        UserAgentInterceptor {
            suffix: self.header_suffix(),
        }
    }
}

impl std::fmt::Display for UserAgentSuffix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Appends the suffix to the `user-agent` header the SDK sets. The header is not part of the
/// SigV4 signature, so it can be changed after signing.
#[derive(Clone, Debug)]
pub struct UserAgentInterceptor {
    suffix: String,
}

impl aws_smithy_runtime_api::client::interceptors::Intercept for UserAgentInterceptor {
    fn name(&self) -> &'static str {
        "AwsroleUserAgentInterceptor"
    }

    fn modify_before_transmit(
        &self,
        context: &mut BeforeTransmitInterceptorContextMut<'_>,
        _runtime_components: &aws_smithy_runtime_api::client::runtime_components::RuntimeComponents,
        _cfg: &mut aws_smithy_types::config_bag::ConfigBag,
    ) -> Result<(), aws_smithy_runtime_api::box_error::BoxError> {
        let headers = context.request_mut().headers_mut();
        let value = match headers.get("user-agent") {
            Some(existing) if !existing.is_empty() => format!("{existing} {}", self.suffix),
            _ => self.suffix.clone(),
        };
        headers.insert("user-agent", value);
        Ok(())
    }
}
