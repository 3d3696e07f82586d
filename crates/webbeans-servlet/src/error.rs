use webbeans::InjectionError;

#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error(transparent)]
    Injection(#[from] InjectionError),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("Container probe failed: {0}")]
    Probe(String),

    #[error("Servlet context attribute {name} {reason}")]
    Attribute { name: String, reason: String },
}

impl EnvironmentError {
    pub(crate) fn attribute(name: &str, reason: impl Into<String>) -> Self {
        EnvironmentError::Attribute {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
