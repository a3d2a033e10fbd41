use thiserror::Error;

/// Convenient result alias for the Terse Transport Times library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
///
/// The `Display` output of every variant is what the HTTP edge returns to
/// clients as the flat `{"error": ...}` string.
#[derive(Debug, Error)]
pub enum Error {
    /// A credential required by the selected provider is absent.
    #[error("{what} not configured")]
    MissingCredential { what: &'static str },

    /// Raised when neither bus direction produced arrivals and at least one failed.
    #[error("{reasons}")]
    BusArrivalsUnavailable { reasons: String },

    /// The upstream answered with a non-success HTTP status.
    #[error("upstream {url} returned HTTP {status}")]
    UpstreamStatus { url: String, status: u16 },

    /// The SOAP service reported a fault.
    #[error("SOAP fault: {message}")]
    SoapFault { message: String },

    /// Raised when a train provider name is not recognised.
    #[error("unknown train provider '{name}'; expected one of huxley, darwin, rtt")]
    UnknownProvider { name: String },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Wrapper for XML parsing errors.
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_reads_naturally() {
        let err = Error::MissingCredential {
            what: "Darwin API key",
        };
        assert_eq!(err.to_string(), "Darwin API key not configured");
    }

    #[test]
    fn bus_unavailable_is_the_joined_reasons_verbatim() {
        let err = Error::BusArrivalsUnavailable {
            reasons: "inbound: timed out; outbound: timed out".to_string(),
        };
        assert_eq!(err.to_string(), "inbound: timed out; outbound: timed out");
    }
}
