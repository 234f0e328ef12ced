//! doc-qa: terminal front end for the documentation Q&A backend.
//! Reads config, takes a question from the argument or stdin (or loops in
//! interactive mode), submits it, and prints the rendered answer and sources.

use clap::Parser;
use doc_qa_client::{config, view, Config, QueryClient, QueryResponse, Session, View};
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "doc-qa", about = "Ask the documentation assistant a question")]
struct Args {
    /// Config file (default: ~/.doc-qa/config.yaml)
    #[arg(long, env = "DOC_QA_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL, overrides server.base_url
    #[arg(long)]
    url: Option<String>,

    /// Disable colours and syntax highlighting (implied when stdout is not a terminal)
    #[arg(long)]
    no_color: bool,

    /// Prompt for questions until EOF or `:quit`
    #[arg(short, long)]
    interactive: bool,

    /// Question to ask; read from stdin when omitted
    question: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Explicit path (flag or env) must load; a missing default file means defaults.
fn load_config(explicit: Option<PathBuf>) -> Config {
    let (path, required) = match explicit {
        Some(path) => (path, true),
        None => match config::default_config_path() {
            Some(path) => (path, false),
            None => return Config::default(),
        },
    };

    if !required && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Config::default();
    }

    config::load(&path).unwrap_or_else(|e| {
        eprintln!("Error: failed to load config from {}: {}", path.display(), e);
        process::exit(1);
    })
}

/// One line from stdin without its terminator. Empty input is a valid question.
fn read_line(input: &mut impl BufRead) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }
    Ok(Some(line))
}

/// Submit the current query, reporting the busy label on stderr while the
/// request is still pending.
async fn submit_with_status(session: &Session) -> QueryResponse {
    let (response, ()) = tokio::join!(session.submit(), async {
        tokio::task::yield_now().await;
        let busy = session.is_busy();
        if busy {
            eprintln!("[{}]", view::submit_label(busy));
        }
    });
    response
}

/// Single question: print the whole screen once the request settles.
async fn ask_once(session: &Session, view: &View, question: String) {
    session.set_query(question);
    submit_with_status(session).await;
    let mut out = io::stdout().lock();
    let _ = write!(out, "{}", view.render_screen(&session.snapshot()));
    let _ = out.flush();
}

async fn interactive(session: &Session, view: &View) {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    println!("{}\n", view.render_title());

    loop {
        print!("{} > ", view::PLACEHOLDER);
        let _ = io::stdout().flush();

        let line = match read_line(&mut input) {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("Error: failed to read input: {}", e);
                break;
            }
        };
        if line.trim() == ":quit" {
            break;
        }

        session.set_query(line);
        let response = submit_with_status(session).await;
        println!("{}", view.render_response(&response));
    }
}

fn main() {
    let args = Args::parse();
    init_logging();

    let mut cfg = load_config(args.config);
    if let Some(url) = args.url {
        cfg.server.base_url = Some(url);
    }
    if args.no_color || !io::stdout().is_terminal() {
        cfg.ui.color = Some(false);
    }

    let client = QueryClient::from_config(&cfg).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });
    let view = View::from_config(&cfg);
    let session = Session::new(client);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    rt.block_on(async {
        if args.interactive {
            interactive(&session, &view).await;
            return;
        }

        let question = match args.question {
            Some(q) => q,
            None => match read_line(&mut io::stdin().lock()) {
                Ok(line) => line.unwrap_or_default(),
                Err(e) => {
                    eprintln!("Error: failed to read question from stdin: {}", e);
                    process::exit(1);
                }
            },
        };
        ask_once(&session, &view, question).await;
    });
}
