mod dispatcher;
mod draft;
mod errors;
mod form;
mod helpers;
use crate::dispatcher::{Dispatcher, Transport};
use crate::draft::Method;
use crate::errors::ProbeError;
use crate::form::FormSession;
use structopt::StructOpt;
use tokio::io::BufReader;
use log::info;
use log::error;
use std::path::PathBuf;
use std::fs;
use async_trait::async_trait;

#[derive(StructOpt, Debug, Clone)]
#[structopt(name = "cors-probe", about = "Send one HTTP request described by a cURL command and show the JSON response.")]
pub struct Opt {
    /// cURL command to parse, e.g. curl 'https://host/path' -X 'POST' -H 'Key: Value' --data-raw '{}'
    #[structopt(short = "c", long = "curl")]
    curl: Option<String>,

    /// File holding a cURL command (such as a browser's "Copy as cURL")
    #[structopt(short = "f", long = "file", parse(from_os_str))]
    file: Option<PathBuf>,

    /// Request URL, overrides the parsed one
    #[structopt(short = "u", long = "url")]
    url: Option<String>,

    /// HTTP method: GET, POST, PUT or DELETE
    #[structopt(short = "X", long = "method")]
    method: Option<Method>,

    /// Header line "Key: Value", repeatable; replaces the parsed headers
    #[structopt(short = "H", long = "header", number_of_values = 1)]
    headers: Vec<String>,

    /// JSON body, sent for every method except GET
    #[structopt(short = "d", long = "data")]
    body: Option<String>,

    /// Print the parsed request and exit without sending it
    #[structopt(long = "parse-only")]
    parse_only: bool,

    /// Edit and send the request from an interactive prompt
    #[structopt(short, long)]
    interactive: bool,

    /// Enable verbose logging
    #[structopt(short, long)]
    verbose: bool,
}

struct App {
    opt: Opt,
}

#[async_trait]
pub trait AppRunner {
    fn init(opt: Opt) -> Self;
    async fn run(&self) -> Result<(), Box<dyn std::error::Error>>;
}

impl App {
    /// Fills the draft: cURL file, then cURL text, then explicit field flags.
    fn fill_draft<T: Transport>(&self, session: &mut FormSession<T>) -> Result<(), ProbeError> {
        if let Some(path) = &self.opt.file {
            let command = fs::read_to_string(path)?;
            session.parse_curl(&command);
        }
        if let Some(command) = &self.opt.curl {
            session.parse_curl(command);
        }

        let draft = &mut session.draft;
        if let Some(url) = &self.opt.url {
            draft.url = url.clone();
        }
        if let Some(method) = self.opt.method {
            draft.method = method;
        }
        if !self.opt.headers.is_empty() {
            draft.headers_text = self.opt.headers.join("\n");
        }
        if let Some(body) = &self.opt.body {
            draft.body_text = body.clone();
        }
        Ok(())
    }
}

#[async_trait]
impl AppRunner for App {
    fn init(opt: Opt) -> Self {
        Self { opt }
    }

    async fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.opt.verbose {
            env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();
        } else {
            env_logger::Builder::new().filter_level(log::LevelFilter::Info).init();
        }

        let mut session = FormSession::new(Dispatcher::new());
        self.fill_draft(&mut session)?;

        if self.opt.interactive {
            let input = BufReader::new(tokio::io::stdin());
            let mut out = std::io::stdout();
            form::run_prompt(&mut session, input, &mut out).await?;
            return Ok(());
        }

        if self.opt.parse_only {
            println!("{}", session.draft);
            return Ok(());
        }

        if session.draft.url.trim().is_empty() {
            error!("Error: No URL provided. Pass a cURL command with --curl or --file, or set --url.");
            return Err(ProbeError::Other("No URL provided".to_string()))?;
        }

        let pb = form::spinner(&session.draft);
        let outcome = session.submit().await;
        pb.finish_and_clear();

        if let Err(e) = outcome {
            error!("{}", e);
            std::process::exit(1);
        }

        info!("Done.");
        println!("{}", form::render(&session.response));
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opt = Opt::from_args();
    let app = App::init(opt);
    app.run().await
}

#[cfg(test)]
mod cli_tests {
    use super::*;
    use crate::dispatcher::MockTransport;
    use std::io::Write;

    #[test]
    fn test_argument_parsing() {
        let args = vec![
            "cors-probe",
            "-X", "put",
            "-H", "A: 1",
            "-H", "B: 2",
            "-d", "{}",
            "--url", "https://a.io",
        ];
        let opt = Opt::from_iter(args);
        assert_eq!(opt.method, Some(Method::Put));
        assert_eq!(opt.headers, vec!["A: 1", "B: 2"]);
        assert_eq!(opt.body.as_deref(), Some("{}"));
        assert_eq!(opt.url.as_deref(), Some("https://a.io"));
        assert!(!opt.interactive);
    }

    #[test]
    fn test_unsupported_method_is_rejected() {
        let args = vec!["cors-probe", "-X", "PATCH"];
        assert!(Opt::from_iter_safe(args).is_err());
    }

    #[test]
    fn test_flags_override_parsed_curl() {
        let args = vec![
            "cors-probe",
            "--curl", "curl 'https://a.io/x' -X 'POST' -H 'A: 1' --data-raw '{\"a\":1}'",
            "-X", "DELETE",
            "-H", "B: 2",
        ];
        let app = App::init(Opt::from_iter(args));
        let mut session = FormSession::new(MockTransport::new());
        app.fill_draft(&mut session).unwrap();

        assert_eq!(session.draft.url, "https://a.io/x");
        assert_eq!(session.draft.method, Method::Delete);
        assert_eq!(session.draft.headers_text, "B: 2");
        assert_eq!(session.draft.body_text, "{\"a\":1}");
    }

    #[test]
    fn test_curl_file_is_read() {
        let path = std::env::temp_dir().join("cors_probe_curl_file_test.txt");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "curl 'https://a.io/from-file' \\").unwrap();
        writeln!(file, "  -H 'Origin: https://b.io'").unwrap();
        drop(file);

        let args = vec!["cors-probe", "-f", path.to_str().unwrap()];
        let app = App::init(Opt::from_iter(args));
        let mut session = FormSession::new(MockTransport::new());
        app.fill_draft(&mut session).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(session.draft.url, "https://a.io/from-file");
        assert_eq!(session.draft.headers_text, "Origin: https://b.io");
    }
}
