use chefmatch_core::ports::PortError;

/// Why a recommendation set could not be generated.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Empty user id or category. Never succeeds on retry.
    #[error("Invalid generation input: {0}")]
    InvalidInput(String),

    /// The catalog has no recipes for the category yet. An expected outcome,
    /// not a fault.
    #[error("No recipes for category '{category}'")]
    NoMatch { category: String },

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(#[source] PortError),

    #[error("Failed to store recommendations: {0}")]
    StoreWrite(#[source] PortError),
}

impl GenerationError {
    /// Whether trying again later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GenerationError::CatalogUnavailable(_) | GenerationError::StoreWrite(_)
        )
    }
}
