pub type TexResult<T> = Result<T, TexError>;

#[derive(thiserror::Error, Debug)]
pub enum TexError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("rasterization error: {0}")]
    Rasterization(String),

    #[error("cyclic graph: node '{node_id}' is reachable from itself")]
    CyclicGraph { node_id: String },

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TexError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn rasterization(msg: impl Into<String>) -> Self {
        Self::Rasterization(msg.into())
    }

    pub fn cyclic(node_id: impl Into<String>) -> Self {
        Self::CyclicGraph {
            node_id: node_id.into(),
        }
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether a live preview should keep its previous frame instead of surfacing this error.
    pub fn is_recoverable_preview_failure(&self) -> bool {
        matches!(self, Self::Rasterization(_))
    }
}

impl From<serde_json::Error> for TexError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}
