use aws_smithy_types::error::display::DisplayErrorContext;

type AssumeRoleSdkError =
    aws_sdk_sts::error::SdkError<aws_sdk_sts::operation::assume_role::AssumeRoleError>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("No ambient credentials available: {0}")]
    CredentialsNotFound(String),

    #[error("Failed to load ambient credentials: {}", DisplayErrorContext(.0))]
    CredentialsError(#[from] aws_credential_types::provider::error::CredentialsError),

    #[error("sts:AssumeRole failed: {}", DisplayErrorContext(.0))]
    AssumeRoleError(#[from] AssumeRoleSdkError),

    #[error("Invalid request: {0}")]
    BuildError(#[from] aws_sdk_sts::error::BuildError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to serialize role tags: {0}")]
    SerializationError(#[source] serde_json::Error),

    #[error(transparent)]
    StdIoError(#[from] std::io::Error),

    #[error(transparent)]
    UrlError(#[from] url::ParseError),
}

/// Coarse classification handed to the host so it can choose a policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Authentication,
    Transient,
    Serialization,
}

const AUTHENTICATION_ERROR_CODES: &[&str] = &[
    "AccessDenied",
    "AccessDeniedException",
    "ExpiredToken",
    "ExpiredTokenException",
    "IncompleteSignature",
    "InvalidClientTokenId",
    "MissingAuthenticationToken",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
];

const TRANSIENT_ERROR_CODES: &[&str] = &[
    "IDPCommunicationError",
    "InternalFailure",
    "RequestLimitExceeded",
    "RequestThrottled",
    "RequestTimeout",
    "ServiceUnavailable",
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
];

impl Error {
    pub fn kind(&self) -> ErrorKind {
        use aws_credential_types::provider::error::CredentialsError;

        match *self {
            Self::ConfigError(_)
            | Self::BuildError(_)
            | Self::StdIoError(_)
            | Self::UrlError(_) => ErrorKind::Configuration,
            Self::CredentialsNotFound(_) => ErrorKind::Authentication,
            Self::CredentialsError(ref e) => match e {
                CredentialsError::CredentialsNotLoaded(_) => ErrorKind::Authentication,
                CredentialsError::InvalidConfiguration(_) => ErrorKind::Configuration,
                _ => ErrorKind::Transient,
            },
            Self::AssumeRoleError(ref e) => classify_sdk_error(e),
            Self::InvalidResponse(_) => ErrorKind::Transient,
            Self::SerializationError(_) => ErrorKind::Serialization,
        }
    }

    /// Service error code returned by STS, e.g. `AccessDenied`.
    pub fn code(&self) -> Option<&str> {
        use aws_sdk_sts::error::ProvideErrorMetadata as _;
        match *self {
            Self::AssumeRoleError(aws_sdk_sts::error::SdkError::ServiceError(ref ctx)) => {
                ctx.err().code()
            }
            _ => None,
        }
    }
}

fn classify_sdk_error(e: &AssumeRoleSdkError) -> ErrorKind {
    use aws_sdk_sts::error::ProvideErrorMetadata as _;
    match e {
        aws_sdk_sts::error::SdkError::ConstructionFailure(_) => ErrorKind::Configuration,
        aws_sdk_sts::error::SdkError::ServiceError(ctx) => classify_api_error(
            ctx.raw().status().as_u16(),
            ctx.err().code().unwrap_or_default(),
        ),
        // timeouts, connection failures and unparseable responses
        _ => ErrorKind::Transient,
    }
}

fn classify_api_error(status: u16, code: &str) -> ErrorKind {
    if AUTHENTICATION_ERROR_CODES.contains(&code) {
        return ErrorKind::Authentication;
    }
    if TRANSIENT_ERROR_CODES.contains(&code) {
        return ErrorKind::Transient;
    }
    if status >= 500 || status == 429 {
        return ErrorKind::Transient;
    }
    if status == 401 || status == 403 {
        return ErrorKind::Authentication;
    }
    ErrorKind::Configuration
}
