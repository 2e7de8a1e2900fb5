//! Fixtures for tests: replayed STS responses and an ambient identity that counts its use.

use aws_credential_types::provider::future;
use aws_smithy_runtime::client::http::test_util::{ReplayEvent, StaticReplayClient};

/// Role ARN that STS rejects with AccessDenied in [`access_denied`].
pub const MISSING_ROLE_ARN: &str = "arn:aws:iam::000000000000:role/DoesNotExist";
pub const THROTTLED_ROLE_ARN: &str = "arn:aws:iam::123456789012:role/Throttled";

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub headers: Vec<(String, String)>,
    pub form: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Requests the SDK sent through `http_client`, with the form body decoded.
pub fn recorded(http_client: &StaticReplayClient) -> Vec<RecordedRequest> {
    http_client
        .actual_requests()
        .map(|req| RecordedRequest {
            headers: req
                .headers()
                .iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
            form: url::form_urlencoded::parse(req.body().bytes().unwrap_or_default())
                .into_owned()
                .collect(),
        })
        .collect()
}

pub fn role_name(arn: &str) -> &str {
    arn.rsplit('/').next().unwrap_or(arn)
}

fn reply(status: u16, body: String) -> ReplayEvent {
    ReplayEvent::new(
        http::Request::builder()
            .method("POST")
            .uri("https://sts.us-east-1.amazonaws.com/")
            .body(aws_smithy_types::body::SdkBody::empty())
            .unwrap(),
        http::Response::builder()
            .status(status)
            .header("content-type", "text/xml")
            .body(aws_smithy_types::body::SdkBody::from(body))
            .unwrap(),
    )
}

/// Successful AssumeRole; the issued credentials are derived from the role name so tests can
/// tell which feature produced them.
pub fn assumed(role_arn: &str) -> ReplayEvent {
    reply(200, assume_role_xml(role_name(role_arn)))
}

pub fn access_denied(role_arn: &str) -> ReplayEvent {
    let message =
        format!("User is not authorized to perform: sts:AssumeRole on resource: {role_arn}");
    reply(403, sts_error_xml("Sender", "AccessDenied", &message))
}

pub fn throttled() -> ReplayEvent {
    reply(400, sts_error_xml("Sender", "Throttling", "Rate exceeded"))
}

pub fn assume_role_xml(name: &str) -> String {
    format!(
        r#"<AssumeRoleResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <AssumeRoleResult>
    <SourceIdentity>DevUser123</SourceIdentity>
    <AssumedRoleUser>
      <Arn>arn:aws:sts::123456789012:assumed-role/{name}/build</Arn>
      <AssumedRoleId>ARO123EXAMPLE123:build</AssumedRoleId>
    </AssumedRoleUser>
    <Credentials>
      <AccessKeyId>ASIA{name}</AccessKeyId>
      <SecretAccessKey>secret-{name}</SecretAccessKey>
      <SessionToken>token-{name}</SessionToken>
      <Expiration>2030-07-15T23:28:33.359Z</Expiration>
    </Credentials>
    <PackedPolicySize>6</PackedPolicySize>
  </AssumeRoleResult>
  <ResponseMetadata>
    <RequestId>c6104cbe-af31-11e0-8154-cbc7ccf896c7</RequestId>
  </ResponseMetadata>
</AssumeRoleResponse>"#
    )
}

pub fn sts_error_xml(type_: &str, code: &str, message: &str) -> String {
    format!(
        r#"<ErrorResponse xmlns="https://sts.amazonaws.com/doc/2011-06-15/">
  <Error>
    <Type>{type_}</Type>
    <Code>{code}</Code>
    <Message>{message}</Message>
  </Error>
  <RequestId>4a0c7a5d-0000-0000-0000-000000000000</RequestId>
</ErrorResponse>"#
    )
}

/// Ambient credentials that count how often they were asked for.
#[derive(Clone, Debug, Default)]
pub struct CountingProvider {
    calls: std::sync::Arc<std::sync::atomic::AtomicUsize>,
}

impl CountingProvider {
    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl aws_credential_types::provider::ProvideCredentials for CountingProvider {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        future::ProvideCredentials::ready(Ok(
            aws_credential_types::Credentials::new(
                "AKIDAMBIENT",
                "ambient-secret",
                Some("ambient-token".to_string()),
                None,
                "Counting",
            ),
        ))
    }
}

/// A process with no identity at all.
#[derive(Clone, Debug, Default)]
pub struct NoCredentials;

impl aws_credential_types::provider::ProvideCredentials for NoCredentials {
    fn provide_credentials<'a>(&'a self) -> future::ProvideCredentials<'a>
    where
        Self: 'a,
    {
        future::ProvideCredentials::ready(Err(
            aws_credential_types::provider::error::CredentialsError::not_loaded(
                "no providers in chain provided credentials",
            ),
        ))
    }
}

pub fn make_sdk_config(
    http_client: &StaticReplayClient,
    ambient: impl aws_credential_types::provider::ProvideCredentials + 'static,
) -> aws_types::SdkConfig {
    aws_types::SdkConfig::builder()
        .behavior_version(aws_config::BehaviorVersion::latest())
        .region(aws_types::region::Region::new("us-east-1"))
        .credentials_provider(
            aws_credential_types::provider::SharedCredentialsProvider::new(ambient),
        )
        .http_client(http_client.clone())
        .retry_config(
            aws_smithy_types::retry::RetryConfig::standard()
                .with_initial_backoff(std::time::Duration::from_millis(1)),
        )
        .build()
}

pub fn test_user_agent() -> crate::user_agent::UserAgentSuffix {
    crate::user_agent::UserAgentSuffix::new("1.0.0", Some("https://ci.test.invalid/"))
}

pub struct TestHarness {
    pub assumer: crate::assume::RoleAssumer,
    pub http_client: StaticReplayClient,
    pub ambient: CountingProvider,
}

impl TestHarness {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        recorded(&self.http_client)
    }
}

/// RoleAssumer whose calls are answered by `events` in order, with [`CountingProvider`] as the
/// ambient identity.
pub fn make_test_assumer(events: Vec<ReplayEvent>) -> TestHarness {
    let http_client = StaticReplayClient::new(events);
    let ambient = CountingProvider::default();
    let assumer = crate::assume::RoleAssumer::new(
        make_sdk_config(&http_client, ambient.clone()),
        test_user_agent(),
    );
    TestHarness {
        assumer,
        http_client,
        ambient,
    }
}
