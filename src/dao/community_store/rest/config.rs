use super::error::{RestDaoError, RestResult};

/// Runtime configuration describing how to reach the hosted backend.
#[derive(Debug, Clone)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
    /// Non-default schema exposed by the REST gateway.
    pub schema: Option<String>,
}

impl RestConfig {
    /// Construct a configuration from an explicit project URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            schema: None,
        }
    }

    /// Target a schema other than the gateway default.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> RestResult<Self> {
        let base_url = std::env::var("BAAS_URL")
            .map_err(|_| RestDaoError::MissingEnvVar { var: "BAAS_URL" })?;
        let api_key = std::env::var("BAAS_KEY")
            .map_err(|_| RestDaoError::MissingEnvVar { var: "BAAS_KEY" })?;

        let mut config = Self::new(base_url, api_key);
        if let Some(schema) = std::env::var("BAAS_SCHEMA").ok().filter(|s| !s.is_empty()) {
            config = config.with_schema(schema);
        }

        Ok(config)
    }
}
