use super::dispatcher::{build_request, Transport};
use super::draft::{Method, RequestDraft, ResponseState};
use super::errors::ProbeError;
use super::helpers::parse_curl_command;
use indicatif::ProgressBar;
use log::{debug, info};
use std::io::Write;
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

pub const HELP: &str = "\
Commands:
  curl '<url>' -X '<METHOD>' -H '<K: V>' --data-raw '<json>'   parse a cURL command
  url <value>          set the request URL
  method <m>           GET, POST, PUT or DELETE
  header <K: V>        add a header line
  headers clear        remove all headers
  body <json>          set the request body
  show                 print the request
  send                 send the request
  help                 print this list
  quit                 leave";

/// The form: one draft, one response, and the transport that sends it.
pub struct FormSession<T> {
    transport: T,
    pub draft: RequestDraft,
    pub response: ResponseState,
}

impl<T: Transport> FormSession<T> {
    pub fn new(transport: T) -> Self {
        FormSession {
            transport,
            draft: RequestDraft::default(),
            response: ResponseState::default(),
        }
    }

    pub fn parse_curl(&mut self, command: &str) {
        let parsed = parse_curl_command(command);
        if parsed.is_empty() {
            debug!("Nothing recognizable in cURL command, draft unchanged");
        }
        self.draft.apply(parsed);
    }

    /// Sends the draft and records the outcome in `response`.
    ///
    /// Header and body errors abort before the network is touched and leave
    /// `response` as it was. Taking `&mut self` means a session can only have
    /// one submission in flight, so a slow earlier response can never
    /// overwrite a later one.
    pub async fn submit(&mut self) -> Result<(), ProbeError> {
        let request = build_request(&self.draft)?;
        let url = request.url.clone();

        self.response = ResponseState::Loading;
        match self.transport.execute(request).await {
            Ok(reply) => {
                info!("{} answered with status {}", url, reply.status);
                if reply.cors.is_empty() {
                    info!("No access-control-* headers in the response");
                }
                for (name, value) in &reply.cors {
                    info!("{}: {}", name, value);
                }
                self.response = ResponseState::Success(reply.body);
                Ok(())
            }
            Err(e) => {
                self.response = ResponseState::Error(e.to_string());
                Err(e)
            }
        }
    }

    async fn handle<W: Write>(&mut self, command: FormCommand, out: &mut W) -> Result<(), ProbeError> {
        match command {
            FormCommand::Curl(text) => {
                self.parse_curl(&text);
                writeln!(out, "{}", self.draft)?;
            }
            FormCommand::Url(url) => self.draft.url = url,
            FormCommand::Method(method) => self.draft.method = method,
            FormCommand::Header(line) => {
                if !self.draft.headers_text.is_empty() {
                    self.draft.headers_text.push('\n');
                }
                self.draft.headers_text.push_str(&line);
            }
            FormCommand::ClearHeaders => self.draft.headers_text.clear(),
            FormCommand::Body(text) => self.draft.body_text = text,
            FormCommand::Show => writeln!(out, "{}", self.draft)?,
            FormCommand::Submit => {
                let pb = spinner(&self.draft);
                let outcome = self.submit().await;
                pb.finish_and_clear();
                match outcome {
                    Ok(()) => writeln!(out, "Response:\n{}", render(&self.response))?,
                    Err(e) => writeln!(out, "error: {}", e)?,
                }
            }
            FormCommand::Help => writeln!(out, "{}", HELP)?,
            FormCommand::Quit => {}
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    Curl(String),
    Url(String),
    Method(Method),
    Header(String),
    ClearHeaders,
    Body(String),
    Show,
    Submit,
    Help,
    Quit,
}

impl FromStr for FormCommand {
    type Err = ProbeError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            // the parser wants the `curl` token itself
            "curl" => Ok(FormCommand::Curl(line.to_string())),
            "url" => Ok(FormCommand::Url(rest.to_string())),
            "method" => rest.parse().map(FormCommand::Method),
            "header" => Ok(FormCommand::Header(rest.to_string())),
            "headers" if rest == "clear" => Ok(FormCommand::ClearHeaders),
            "body" => Ok(FormCommand::Body(rest.to_string())),
            "show" => Ok(FormCommand::Show),
            "send" => Ok(FormCommand::Submit),
            "help" => Ok(FormCommand::Help),
            "quit" | "exit" => Ok(FormCommand::Quit),
            other => Err(ProbeError::Other(format!(
                "Unknown command `{}`, type `help` for the list",
                other
            ))),
        }
    }
}

/// Pretty JSON for a success, the message for an error.
pub fn render(state: &ResponseState) -> String {
    match state {
        ResponseState::Absent => String::new(),
        ResponseState::Loading => "Sending...".to_string(),
        ResponseState::Success(value) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        ResponseState::Error(msg) => msg.clone(),
    }
}

pub fn spinner(draft: &RequestDraft) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(&format!("{} {}", draft.method, draft.url));
    pb.enable_steady_tick(100);
    pb
}

/// Reads one entry; lines ending in `\` continue on the next line.
async fn next_entry<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<Option<String>, ProbeError> {
    let mut entry = match lines.next_line().await? {
        Some(line) => line,
        None => return Ok(None),
    };
    while entry.trim_end().ends_with('\\') {
        match lines.next_line().await? {
            Some(next) => {
                entry.push('\n');
                entry.push_str(&next);
            }
            None => break,
        }
    }
    Ok(Some(entry))
}

/// Runs the form as a line-oriented prompt until `quit` or end of input.
pub async fn run_prompt<T, R, W>(session: &mut FormSession<T>, input: R, out: &mut W) -> Result<(), ProbeError>
where
    T: Transport,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{}", HELP)?;

    loop {
        write!(out, "> ")?;
        out.flush()?;

        let entry = match next_entry(&mut lines).await? {
            Some(entry) => entry,
            None => break,
        };
        if entry.trim().is_empty() {
            continue;
        }

        match entry.parse::<FormCommand>() {
            Ok(FormCommand::Quit) => break,
            Ok(command) => session.handle(command, out).await?,
            Err(e) => writeln!(out, "error: {}", e)?,
        }
    }
    writeln!(out)?;
    Ok(())
}
