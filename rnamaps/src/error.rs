/// Errors raised by the RNA-map pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AnalysisError {
    #[error("malformed event {event_id}: {reason}")]
    MalformedEvent { event_id: String, reason: String },

    #[error("quantile bin {bin} cannot supply {requested} controls ({available} available)")]
    InsufficientPool {
        bin: usize,
        requested: usize,
        available: usize,
    },

    #[error("bin [{start}, {end}) has no usable row-means on one side")]
    InsufficientData { start: usize, end: usize },
}

impl AnalysisError {
    pub fn malformed(event_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEvent {
            event_id: event_id.into(),
            reason: reason.into(),
        }
    }
}
