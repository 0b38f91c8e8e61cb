use std::fmt;

#[derive(Debug)]
pub enum ProbeError {
    /// A header line could not be turned into a wire header.
    HeaderParse(String),
    /// The body text is not valid JSON.
    BodyParse(serde_json::Error),
    /// The request failed or its response was not JSON.
    Network(reqwest::Error),
    Io(std::io::Error),
    Other(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        ProbeError::Network(err)
    }
}

impl From<serde_json::Error> for ProbeError {
    fn from(err: serde_json::Error) -> Self {
        ProbeError::BodyParse(err)
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        ProbeError::Io(err)
    }
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::HeaderParse(msg) => write!(f, "Invalid headers format: {}", msg),
            ProbeError::BodyParse(err) => write!(f, "Invalid body: {}", err),
            ProbeError::Network(err) => write!(f, "Request failed: {}", err),
            ProbeError::Io(err) => write!(f, "I/O error: {}", err),
            ProbeError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ProbeError {}
