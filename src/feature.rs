//! `awsrole` build feature: parameter names and the per-feature role request.

pub const FEATURE_TYPE: &str = "awsrole";

pub mod param {
    pub const ROLE_ARN: &str = "awsrole.roleArn";
    pub const EXTERNAL_ID: &str = "awsrole.externalId";
    pub const SESSION_NAME: &str = "awsrole.sessionName";
    pub const SESSION_DURATION: &str = "awsrole.sessionDuration";
    pub const SESSION_TAGS: &str = "awsrole.sessionTags";
    pub const ACCESS_KEY_ID: &str = "awsrole.accessKeyId";
    pub const SECRET_ACCESS_KEY: &str = "awsrole.secretAccessKey";
}

pub const DEFAULT_SESSION_DURATION: i32 = 3600;
pub const MIN_SESSION_DURATION: i32 = 900;
pub const MAX_SESSION_DURATION: i32 = 43200;
pub const MAX_TAGS: usize = 50;
pub const MAX_TAG_KEY_LEN: usize = 128;
pub const MAX_TAG_VALUE_LEN: usize = 256;

static SESSION_NAME_PATTERN: once_cell::sync::Lazy<regex::Regex> =
    once_cell::sync::Lazy::new(|| regex::Regex::new(r"^[\w+=,.@-]{2,64}$").unwrap());
static EXTERNAL_ID_PATTERN: once_cell::sync::Lazy<regex::Regex> =
    once_cell::sync::Lazy::new(|| regex::Regex::new(r"^[\w+=,.@:/-]{2,1224}$").unwrap());

/// Session tag. Sent in the order given and echoed back to the build as-is.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RoleRequestConfig {
    pub role_arn: String,
    pub external_id: Option<String>,
    pub session_name: String,
    pub session_duration_seconds: i32,
    pub static_access_key_id: Option<String>,
    pub static_secret_key: Option<secrecy::SecretString>,
    pub tags: Vec<Tag>,
}

fn non_blank(
    params: &std::collections::BTreeMap<String, String>,
    name: &str,
) -> Option<String> {
    params
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_owned())
}

impl RoleRequestConfig {
    /// Builds a request from feature parameters that were already resolved by the host.
    pub fn from_parameters(
        params: &std::collections::BTreeMap<String, String>,
    ) -> Result<Self, crate::error::Error> {
        let session_duration_seconds = match non_blank(params, param::SESSION_DURATION) {
            None => DEFAULT_SESSION_DURATION,
            Some(v) => v.parse::<i32>().map_err(|_| {
                crate::error::Error::ConfigError(format!(
                    "{} must be an integer (seconds), got {v:?}",
                    param::SESSION_DURATION
                ))
            })?,
        };

        let tags = match params.get(param::SESSION_TAGS) {
            Some(v) => parse_tags(v)?,
            None => Vec::new(),
        };

        let config = Self {
            role_arn: non_blank(params, param::ROLE_ARN).unwrap_or_default(),
            external_id: non_blank(params, param::EXTERNAL_ID),
            session_name: non_blank(params, param::SESSION_NAME).unwrap_or_default(),
            session_duration_seconds,
            static_access_key_id: non_blank(params, param::ACCESS_KEY_ID),
            static_secret_key: non_blank(params, param::SECRET_ACCESS_KEY)
                .map(secrecy::SecretString::new),
            tags,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), crate::error::Error> {
        validate_role_arn(&self.role_arn)?;

        if !SESSION_NAME_PATTERN.is_match(&self.session_name) {
            return Err(crate::error::Error::ConfigError(format!(
                "session name must be 2-64 characters of [\\w+=,.@-], got {:?}",
                self.session_name
            )));
        }

        if !(MIN_SESSION_DURATION..=MAX_SESSION_DURATION).contains(&self.session_duration_seconds)
        {
            return Err(crate::error::Error::ConfigError(format!(
                "session duration must be between {MIN_SESSION_DURATION} and {MAX_SESSION_DURATION} seconds, got {}",
                self.session_duration_seconds
            )));
        }

        if let Some(ref external_id) = self.external_id {
            if !EXTERNAL_ID_PATTERN.is_match(external_id) {
                return Err(crate::error::Error::ConfigError(
                    "external id must be 2-1224 characters of [\\w+=,.@:/-]".to_string(),
                ));
            }
        }

        if self.static_access_key_id.is_some() != self.static_secret_key.is_some() {
            return Err(crate::error::Error::ConfigError(format!(
                "{} and {} must be given together",
                param::ACCESS_KEY_ID,
                param::SECRET_ACCESS_KEY
            )));
        }

        validate_tags(&self.tags)
    }
}

fn validate_role_arn(arn: &str) -> Result<(), crate::error::Error> {
    if arn.is_empty() {
        return Err(crate::error::Error::ConfigError(format!(
            "{} is required",
            param::ROLE_ARN
        )));
    }
    let len = arn.chars().count();
    if !arn.starts_with("arn:") || arn.split(':').count() < 6 || !(20..=2048).contains(&len) {
        return Err(crate::error::Error::ConfigError(format!(
            "role ARN is malformed: {arn:?}"
        )));
    }
    Ok(())
}

fn validate_tags(tags: &[Tag]) -> Result<(), crate::error::Error> {
    if tags.len() > MAX_TAGS {
        return Err(crate::error::Error::ConfigError(format!(
            "at most {MAX_TAGS} session tags are allowed, got {}",
            tags.len()
        )));
    }
    let mut seen = std::collections::HashSet::with_capacity(tags.len());
    for tag in tags {
        if tag.key.is_empty() || tag.key.chars().count() > MAX_TAG_KEY_LEN {
            return Err(crate::error::Error::ConfigError(format!(
                "session tag key must be 1-{MAX_TAG_KEY_LEN} characters: {:?}",
                tag.key
            )));
        }
        if tag.value.chars().count() > MAX_TAG_VALUE_LEN {
            return Err(crate::error::Error::ConfigError(format!(
                "session tag value for {:?} exceeds {MAX_TAG_VALUE_LEN} characters",
                tag.key
            )));
        }
        if !seen.insert(tag.key.as_str()) {
            return Err(crate::error::Error::ConfigError(format!(
                "duplicate session tag key: {:?}",
                tag.key
            )));
        }
    }
    Ok(())
}

/// Parses `key=value` lines. Blank lines are skipped; the value is everything after the
/// first `=`.
pub fn parse_tags(input: &str) -> Result<Vec<Tag>, crate::error::Error> {
    let mut tags = Vec::new();
    for line in input.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line.split_once('=').ok_or_else(|| {
            crate::error::Error::ConfigError(format!(
                "session tag must be written as key=value: {line:?}"
            ))
        })?;
        tags.push(Tag::new(key.trim(), value));
    }
    Ok(tags)
}
