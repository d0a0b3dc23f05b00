use std::path::PathBuf;

use askdoc::app::App;
use askdoc::auth::AuthClient;
use askdoc::config::{Config, IDENTITY_KEY_ENTRY};
use askdoc::dispatch::ApiClient;
use askdoc::{extract, keychain, logger, render, Error};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

#[derive(Parser)]
#[command(
    name = "askdoc",
    version,
    about = "Ask questions about documents and summarize web pages via a local AI backend"
)]
struct Cli {
    /// Base URL of the local answer/summary backend.
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Fallback log filter when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session with login-gated features (default).
    Chat,
    /// One-shot question, without a session.
    Ask {
        #[arg(long)]
        question: String,
        /// Document file (.txt, .pdf or .docx) to ground the answer in.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// One-shot web-page summary, without a session.
    Summarize { url: String },
    /// Manage the identity provider key in the OS keychain.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Subcommand)]
enum KeyAction {
    /// Prompt for the key and store it.
    Set,
    /// Remove the stored key.
    Clear,
    /// Report whether a key is stored.
    Status,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{}", render::render_error(&e.to_string()));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    logger::init(&cli.log_level)?;

    let mut config = Config::load()?;
    if let Some(api_base) = cli.api_base {
        config.api_base = api_base;
    }

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(&config),
        Command::Ask { question, file } => run_ask(&config, &question, file.as_deref()),
        Command::Summarize { url } => run_summarize(&config, &url),
        Command::Key { action } => run_key(action),
    }
}

fn run_ask(config: &Config, question: &str, file: Option<&std::path::Path>) -> Result<(), Error> {
    let question = question.trim();
    if question.is_empty() {
        return Err(Error::Validation("Please ask a question.".to_string()));
    }
    let document = file.map(extract::extract).transpose()?;
    let answer = ApiClient::new(&config.api_base).answer(question, document.as_deref())?;
    println!("{}", render::render_markdown(&answer));
    Ok(())
}

fn run_summarize(config: &Config, url: &str) -> Result<(), Error> {
    let url = url.trim();
    if url.is_empty() {
        return Err(Error::Validation("Please enter a URL.".to_string()));
    }
    let summary = ApiClient::new(&config.api_base).summarize_url(url)?;
    println!("{}", render::render_markdown(&summary));
    Ok(())
}

fn run_key(action: KeyAction) -> Result<(), Error> {
    match action {
        KeyAction::Set => {
            let mut editor = editor()?;
            let key = read_line(&mut editor, "identity key: ")?
                .ok_or_else(|| Error::Validation("no key entered".to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(Error::Validation("no key entered".to_string()));
            }
            keychain::store_secret(IDENTITY_KEY_ENTRY, key)?;
            println!("Identity key stored.");
        }
        KeyAction::Clear => {
            keychain::delete_secret(IDENTITY_KEY_ENTRY)?;
            println!("Identity key removed.");
        }
        KeyAction::Status => {
            if keychain::has_secret(IDENTITY_KEY_ENTRY) {
                println!("Identity key is configured.");
            } else {
                println!("No identity key stored.");
            }
        }
    }
    Ok(())
}

fn run_chat(config: &Config) -> Result<(), Error> {
    let auth = match (config.identity_url.as_deref(), config.resolve_identity_key()) {
        (Some(url), Ok(key)) => Some(AuthClient::new(url, key)),
        _ => {
            tracing::info!("identity provider not configured; auth commands disabled");
            None
        }
    };
    let mut app = App::new(auth, ApiClient::new(&config.api_base));
    // The current document applies to subsequent `ask` commands until
    // replaced or closed.
    let mut current_file: Option<PathBuf> = None;

    println!("askdoc — type `help` for commands, `quit` to leave.");
    let mut editor = editor()?;
    loop {
        let line = match read_line(&mut editor, "askdoc> ")? {
            Some(line) => line,
            None => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,
            "register" | "login" => {
                let email = read_line(&mut editor, "email: ")?.unwrap_or_default();
                let password = read_line(&mut editor, "password: ")?.unwrap_or_default();
                if command == "register" {
                    app.register(&email, &password);
                } else {
                    app.login(&email, &password);
                }
            }
            "logout" => app.logout(),
            "open" => {
                if rest.is_empty() {
                    println!("usage: open <file>");
                    continue;
                }
                current_file = Some(PathBuf::from(rest));
                println!("Will attach {rest} to the next question.");
                continue;
            }
            "close" => {
                current_file = None;
                println!("Document detached.");
                continue;
            }
            "ask" => app.ask(rest, current_file.as_deref()),
            "summarize" => app.summarize(rest),
            other => {
                println!("unknown command `{other}`; type `help`");
                continue;
            }
        }

        let rendered = app.view().render();
        if !rendered.is_empty() {
            println!("{rendered}\n");
        }
    }
    Ok(())
}

fn print_help() {
    println!(
        "\
commands:
  register           create an account (prompts for email/password)
  login              sign in (prompts for email/password)
  logout             sign out and return to anonymous
  open <file>        attach a .txt/.pdf/.docx document to questions
  close              detach the current document
  ask <question>     ask the AI (uses the attached document, if any)
  summarize <url>    summarize a web page
  quit               leave"
    );
}

fn editor() -> Result<DefaultEditor, Error> {
    DefaultEditor::new().map_err(|e| Error::Config(format!("failed to open terminal: {e}")))
}

/// Read one line; `None` means the user asked to leave (Ctrl-D).
fn read_line(editor: &mut DefaultEditor, prompt: &str) -> Result<Option<String>, Error> {
    match editor.readline(prompt) {
        Ok(line) => Ok(Some(line)),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(e) => Err(Error::Config(format!("terminal read failed: {e}"))),
    }
}
