use super::errors::ProbeError;
use super::helpers::ParsedCurl;
use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Every method except GET sends the body.
    pub fn carries_body(&self) -> bool {
        *self != Method::Get
    }

    /// The form only shows the body field for POST and PUT.
    pub fn shows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            other => Err(ProbeError::Other(format!(
                "Unsupported method `{}` (expected GET, POST, PUT or DELETE)",
                other
            ))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// The editable request behind the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDraft {
    pub url: String,
    pub method: Method,
    /// Newline separated `Key: Value` lines.
    pub headers_text: String,
    /// Raw JSON text.
    pub body_text: String,
}

impl RequestDraft {
    /// Copies every field the cURL command matched. Unmatched fields keep
    /// their current value.
    pub fn apply(&mut self, parsed: ParsedCurl) {
        if let Some(url) = parsed.url {
            debug!("Parsed URL: {}", url);
            self.url = url;
        }
        if let Some(token) = parsed.method {
            match token.parse::<Method>() {
                Ok(method) => {
                    debug!("Parsed method: {}", method);
                    self.method = method;
                }
                Err(e) => warn!("Ignoring method from cURL command: {}", e),
            }
        }
        if !parsed.headers.is_empty() {
            debug!("Parsed {} header(s)", parsed.headers.len());
            self.headers_text = parsed.headers.join("\n");
        }
        if let Some(body) = parsed.body {
            debug!("Parsed body of {} bytes", body.len());
            self.body_text = body;
        }
    }
}

impl fmt::Display for RequestDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "URL:     {}", self.url)?;
        write!(f, "Method:  {}", self.method)?;
        if !self.headers_text.trim().is_empty() {
            write!(f, "\nHeaders:")?;
            for line in self.headers_text.lines() {
                write!(f, "\n  {}", line)?;
            }
        }
        if self.method.shows_body() {
            write!(f, "\nBody:    {}", self.body_text)?;
        }
        Ok(())
    }
}

/// What the form shows under the request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseState {
    #[default]
    Absent,
    Loading,
    Success(Value),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> RequestDraft {
        RequestDraft {
            url: "https://old.example.com".to_string(),
            method: Method::Put,
            headers_text: "X-Old: 1".to_string(),
            body_text: "{}".to_string(),
        }
    }

    #[test]
    fn test_method_parses_case_insensitively() {
        assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
        assert!("PATCH".parse::<Method>().is_err());
    }

    #[test]
    fn test_only_get_goes_without_body() {
        assert!(!Method::Get.carries_body());
        assert!(Method::Post.carries_body());
        assert!(Method::Put.carries_body());
        assert!(Method::Delete.carries_body());
        assert!(!Method::Delete.shows_body());
    }

    #[test]
    fn test_empty_parse_leaves_draft_untouched() {
        let mut draft = filled();
        draft.apply(ParsedCurl::default());
        assert_eq!(draft, filled());
    }

    #[test]
    fn test_unsupported_method_token_is_ignored() {
        let mut draft = filled();
        draft.apply(ParsedCurl {
            method: Some("PATCH".to_string()),
            ..ParsedCurl::default()
        });
        assert_eq!(draft.method, Method::Put);
    }

    #[test]
    fn test_matched_fields_replace_current_values() {
        let mut draft = filled();
        draft.apply(ParsedCurl {
            url: Some("https://new.example.com".to_string()),
            method: None,
            headers: vec!["A: 1".to_string(), "B: 2".to_string()],
            body: None,
        });
        assert_eq!(draft.url, "https://new.example.com");
        assert_eq!(draft.method, Method::Put);
        assert_eq!(draft.headers_text, "A: 1\nB: 2");
        assert_eq!(draft.body_text, "{}");
    }

    #[test]
    fn test_display_hides_body_for_get() {
        let mut draft = filled();
        assert!(draft.to_string().contains("Body:    {}"));
        draft.method = Method::Get;
        let shown = draft.to_string();
        assert!(shown.contains("Method:  GET"));
        assert!(shown.contains("  X-Old: 1"));
        assert!(!shown.contains("Body:"));
    }
}
