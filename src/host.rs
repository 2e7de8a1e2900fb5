//! What the core needs from a build server: the features attached to a running build, a
//! way to resolve their raw parameters, and the build's parameter set.

pub type BuildParameters = std::collections::BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FeatureDescriptor {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub feature_type: String,
    /// Raw values, possibly containing references to other build parameters.
    #[serde(default)]
    pub parameters: std::collections::BTreeMap<String, String>,
}

pub trait RunningBuild: Send + Sync {
    /// Features of the given type in attachment order.
    fn build_features_of_type(&self, feature_type: &str) -> Vec<&FeatureDescriptor>;

    fn resolve(
        &self,
        raw: &std::collections::BTreeMap<String, String>,
    ) -> std::collections::BTreeMap<String, String>;
}

/// A build described in a JSON file, used by the command line host.
///
/// ```json
/// {
///   "parameters": { "build.number": "42" },
///   "features": [
///     { "type": "awsrole", "parameters": { "awsrole.roleArn": "...", "awsrole.sessionName": "ci-%build.number%" } }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BuildDefinition {
    #[serde(default)]
    pub parameters: BuildParameters,
    #[serde(default)]
    pub features: Vec<FeatureDescriptor>,
}

impl BuildDefinition {
    pub async fn load(path: &std::path::Path) -> Result<Self, crate::error::Error> {
        let json = tokio::fs::read(path).await?;
        Self::from_slice(&json).map_err(|e| {
            crate::error::Error::ConfigError(format!(
                "build definition {} is malformed: {e}",
                path.display()
            ))
        })
    }

    pub fn from_slice(json: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(json)
    }
}

impl RunningBuild for BuildDefinition {
    fn build_features_of_type(&self, feature_type: &str) -> Vec<&FeatureDescriptor> {
        self.features
            .iter()
            .filter(|f| f.feature_type == feature_type)
            .collect()
    }

    fn resolve(
        &self,
        raw: &std::collections::BTreeMap<String, String>,
    ) -> std::collections::BTreeMap<String, String> {
        crate::resolve::ValueResolver::new(&self.parameters).resolve_all(raw)
    }
}
