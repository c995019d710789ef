//! Client-side error types.

use ukstat_model::StatError;

/// Errors raised while talking to an upstream service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("could not decode response from {url}: {detail}")]
    Decode { url: String, detail: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

impl ClientError {
    /// The upstream host the failure belongs to, for error reporting.
    fn source_name(&self) -> String {
        let url = match self {
            Self::Http { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => url,
            Self::Build(_) => return "http client".to_string(),
        };
        reqwest::Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(ToString::to_string))
            .unwrap_or_else(|| url.clone())
    }
}

impl From<ClientError> for StatError {
    fn from(err: ClientError) -> Self {
        match &err {
            ClientError::Status { status, .. } if status.is_client_error() => {
                StatError::UpstreamRejected {
                    reason: err.to_string(),
                }
            }
            _ => StatError::UpstreamUnavailable {
                source_name: err.source_name(),
                detail: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_4xx_maps_to_rejected() {
        let err = ClientError::Status {
            url: "https://www.nomisweb.co.uk/api/v01/dataset/def.sdmx.json".to_string(),
            status: reqwest::StatusCode::BAD_REQUEST,
        };
        assert!(matches!(
            StatError::from(err),
            StatError::UpstreamRejected { .. }
        ));
    }

    #[test]
    fn decode_failure_names_the_host() {
        let err = ClientError::Decode {
            url: "https://www.nomisweb.co.uk/api/v01/foo".to_string(),
            detail: "truncated body".to_string(),
        };
        match StatError::from(err) {
            StatError::UpstreamUnavailable { source_name, .. } => {
                assert_eq!(source_name, "www.nomisweb.co.uk");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
