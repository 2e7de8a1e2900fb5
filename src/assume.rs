//! Assumes the role configured on a feature.

/// Result of one feature: the issued credentials and the tags that were sent with the
/// request. STS does not echo session tags back, so they come from the request.
#[derive(Clone, Debug)]
pub struct AssumedRole {
    pub credentials: crate::credentials::TemporaryCredentials,
    pub tags: Vec<crate::feature::Tag>,
}

#[async_trait::async_trait]
pub trait AssumeRole: Send + Sync {
    async fn assume_role(
        &self,
        config: &crate::feature::RoleRequestConfig,
        authenticator: &crate::credentials::Authenticator,
    ) -> Result<AssumedRole, crate::error::Error>;
}

/// Calls sts:AssumeRole through the AWS SDK. The shared [`aws_types::SdkConfig`] supplies
/// region, endpoint, retry policy and the ambient identity.
#[derive(Debug, Clone)]
pub struct RoleAssumer {
    sdk_config: aws_types::SdkConfig,
    user_agent: crate::user_agent::UserAgentSuffix,
}

impl RoleAssumer {
    pub fn new(
        sdk_config: aws_types::SdkConfig,
        user_agent: crate::user_agent::UserAgentSuffix,
    ) -> Self {
        Self {
            sdk_config,
            user_agent,
        }
    }

    async fn signing_credentials(
        &self,
        authenticator: &crate::credentials::Authenticator,
    ) -> Result<aws_credential_types::Credentials, crate::error::Error> {
        use aws_credential_types::provider::ProvideCredentials as _;

        match authenticator {
            crate::credentials::Authenticator::Static(credentials) => Ok(credentials.to_sdk()),
            crate::credentials::Authenticator::Ambient => {
                let provider = self.sdk_config.credentials_provider().ok_or_else(|| {
                    crate::error::Error::CredentialsNotFound(
                        "no static key pair configured and no credentials provider".to_string(),
                    )
                })?;
                Ok(provider.provide_credentials().await?)
            }
        }
    }

    fn client(&self, credentials: aws_credential_types::Credentials) -> aws_sdk_sts::Client {
        let conf = aws_sdk_sts::config::Builder::from(&self.sdk_config)
            .credentials_provider(credentials)
            .interceptor(self.user_agent.interceptor())
            .build();
        aws_sdk_sts::Client::from_conf(conf)
    }
}

fn sdk_tags(
    tags: &[crate::feature::Tag],
) -> Result<Option<Vec<aws_sdk_sts::types::Tag>>, crate::error::Error> {
    if tags.is_empty() {
        return Ok(None);
    }
    let tags = tags
        .iter()
        .map(|t| {
            aws_sdk_sts::types::Tag::builder()
                .key(&t.key)
                .value(&t.value)
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(tags))
}

#[async_trait::async_trait]
impl AssumeRole for RoleAssumer {
    async fn assume_role(
        &self,
        config: &crate::feature::RoleRequestConfig,
        authenticator: &crate::credentials::Authenticator,
    ) -> Result<AssumedRole, crate::error::Error> {
        let credentials = self.signing_credentials(authenticator).await?;

        tracing::info!(
            message = "Assuming AWS IAM role for build",
            role_arn = %config.role_arn,
            session_name = %config.session_name,
            duration_seconds = config.session_duration_seconds,
            external_id = config.external_id.is_some(),
            tags = config.tags.len(),
            static_credentials = authenticator.is_static(),
            region = ?self.sdk_config.region(),
            endpoint = ?self.sdk_config.endpoint_url(),
        );
        let output = self
            .client(credentials)
            .assume_role()
            .role_arn(&config.role_arn)
            .role_session_name(&config.session_name)
            .duration_seconds(config.session_duration_seconds)
            .set_external_id(config.external_id.clone())
            .set_tags(sdk_tags(&config.tags)?)
            .send()
            .await?;

        let issued = output.credentials().ok_or_else(|| {
            crate::error::Error::InvalidResponse(
                "AssumeRoleResult has no Credentials".to_string(),
            )
        })?;
        let credentials = crate::credentials::TemporaryCredentials::try_from(issued)?;
        tracing::info!(
            message = "Assumed AWS IAM role",
            role_arn = %config.role_arn,
            access_key_id = %credentials.access_key_id,
            expiration = %credentials.expiration,
            assumed_role_user_arn = ?output.assumed_role_user().map(|u| u.arn()),
        );

        Ok(AssumedRole {
            credentials,
            tags: config.tags.clone(),
        })
    }
}
