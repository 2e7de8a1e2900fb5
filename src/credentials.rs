//! Credential types and the choice between a static key pair and the ambient identity.

use secrecy::ExposeSecret as _;

const STATIC_PROVIDER_NAME: &str = "AwsroleFeature";

/// Credentials used to sign a request.
#[derive(Clone, Debug)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: secrecy::SecretString,
    pub session_token: Option<secrecy::SecretString>,
    pub expiration: Option<chrono::DateTime<chrono::Utc>>,
}

impl Credentials {
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secrecy::SecretString::new(secret_access_key.into()),
            session_token: session_token.map(secrecy::SecretString::new),
            expiration: None,
        }
    }

    /// Credentials in the form the AWS SDK signs with.
    pub fn to_sdk(&self) -> aws_credential_types::Credentials {
        aws_credential_types::Credentials::new(
            self.access_key_id.clone(),
            self.secret_access_key.expose_secret().clone(),
            self.session_token.as_ref().map(|t| t.expose_secret().clone()),
            self.expiration.map(std::time::SystemTime::from),
            STATIC_PROVIDER_NAME,
        )
    }
}

/// Temporary credentials as returned by sts:AssumeRole.
#[derive(Clone, Debug)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: secrecy::SecretString,
    pub session_token: secrecy::SecretString,
    pub expiration: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<&aws_sdk_sts::types::Credentials> for TemporaryCredentials {
    type Error = crate::error::Error;

    fn try_from(c: &aws_sdk_sts::types::Credentials) -> Result<Self, Self::Error> {
        use chrono::TimeZone as _;

        let expiration = c.expiration();
        let expiration = chrono::Utc
            .timestamp_opt(expiration.secs(), expiration.subsec_nanos())
            .single()
            .ok_or_else(|| {
                crate::error::Error::InvalidResponse(format!(
                    "Expiration is out of range: {expiration:?}"
                ))
            })?;
        Ok(Self {
            access_key_id: c.access_key_id().to_owned(),
            secret_access_key: secrecy::SecretString::new(c.secret_access_key().to_owned()),
            session_token: secrecy::SecretString::new(c.session_token().to_owned()),
            expiration,
        })
    }
}

/// How the AssumeRole call gets signed.
#[derive(Clone, Debug)]
pub enum Authenticator {
    /// Exactly the key pair configured on the feature.
    Static(Credentials),
    /// Whatever identity the process already holds, through the SDK default credentials chain.
    Ambient,
}

impl Authenticator {
    pub fn is_static(&self) -> bool {
        matches!(*self, Self::Static(_))
    }
}

pub fn select(config: &crate::feature::RoleRequestConfig) -> Authenticator {
    match (&config.static_access_key_id, &config.static_secret_key) {
        (Some(access_key_id), Some(secret_key))
            if !access_key_id.is_empty() && !secret_key.expose_secret().is_empty() =>
        {
            Authenticator::Static(Credentials {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_key.clone(),
                session_token: None,
                expiration: None,
            })
        }
        _ => Authenticator::Ambient,
    }
}
