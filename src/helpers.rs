use once_cell::sync::Lazy;
use regex::Regex;

// Each field is its own search over the whole command, so flag order does not
// matter. Only single-quoted arguments match and quotes are never unescaped.
static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"curl\s+'(https?://[^\s]+)'").expect("url pattern"));
static METHOD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-X\s'(\w+)'").expect("method pattern"));
static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"-H\s'([^']+)'").expect("header pattern"));
static BODY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"--data-raw\s'([^']+)'").expect("body pattern"));

/// Fields found in a cURL command. Anything not found stays `None` or empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedCurl {
    pub url: Option<String>,
    pub method: Option<String>,
    pub headers: Vec<String>,
    pub body: Option<String>,
}

impl ParsedCurl {
    pub fn is_empty(&self) -> bool {
        self.url.is_none() && self.method.is_none() && self.headers.is_empty() && self.body.is_none()
    }
}

/// Best-effort extraction of url, method, headers and body from a cURL
/// command such as `curl '<url>' -X 'POST' -H 'Key: Value' --data-raw '<json>'`.
///
/// This is not a shell parser: double-quoted arguments are not recognized and
/// a value stops at its first embedded single quote.
pub fn parse_curl_command(command: &str) -> ParsedCurl {
    ParsedCurl {
        url: first_capture(&URL_RE, command),
        method: first_capture(&METHOD_RE, command),
        headers: HEADER_RE
            .captures_iter(command)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .collect(),
        body: first_capture(&BODY_RE, command),
    }
}

fn first_capture(re: &Regex, command: &str) -> Option<String> {
    re.captures(command)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Header name to value, in first-seen order. A repeated name keeps its slot
/// and takes the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Turns `Key: Value` lines into a [`HeaderMap`]. Lines are split on the first
/// colon and both halves trimmed; a line without a colon becomes a name with
/// an empty value. Blank lines are skipped.
pub fn header_text_to_map(text: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for line in text.split('\n').filter(|line| !line.trim().is_empty()) {
        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }
    headers
}
