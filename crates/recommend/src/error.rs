use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("no candidate recipes")]
    NoCandidates,

    #[error("none of the {candidates} candidate recipes is safe for this user")]
    NoSafeCandidates { candidates: usize },

    #[error("allergy profile unavailable: {0}")]
    AllergyProfileUnavailable(#[source] anyhow::Error),

    #[error("candidate recipes unavailable: {0}")]
    CandidatesUnavailable(#[source] anyhow::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<RecommendError> for mealpick_shared::Error {
    fn from(value: RecommendError) -> Self {
        match value {
            RecommendError::InvalidRequest(msg) => mealpick_shared::Error::Invalid(msg),
            RecommendError::Config(err) => mealpick_shared::Error::Invalid(err.to_string()),
            other => mealpick_shared::Error::Server(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_errors_map_to_invalid() {
        let invalid = mealpick_shared::Error::from(RecommendError::InvalidRequest("days".to_owned()));
        let server = mealpick_shared::Error::from(RecommendError::NoSafeCandidates { candidates: 3 });

        assert!(matches!(invalid, mealpick_shared::Error::Invalid(msg) if msg == "days"));
        assert!(matches!(
            server,
            mealpick_shared::Error::Server(msg) if msg == "none of the 3 candidate recipes is safe for this user"
        ));
    }
}
