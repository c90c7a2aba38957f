mod output;

use anyhow::{Context, Result};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{ArgAction, Parser, Subcommand};
use output::{
    AddOutput, CheckoutOutput, CommandInfo, CommitOutput, ConfigOutput, HelpOutput, LogOutput,
    MessageOutput, OutputWriter, RESULT_FAILED, RESULT_OK, RESULT_REJECTED, RestoredFile,
    TrackedOutput,
};
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use svcs_core::{AddOutcome, CommitOutcome, Error, Repository};
use tracing::Level;

/// Commands listed by the usage summary.
const COMMANDS: [(&str, &str); 5] = [
    ("config", "Get and set a username."),
    ("add", "Add a file to the index."),
    ("log", "Show commit logs."),
    ("commit", "Save changes."),
    ("checkout", "Restore a file."),
];

const MESSAGE_MISSING: &str = "Message was not passed.";
const COMMIT_ID_MISSING: &str = "Commit id was not passed.";

/// SVCS - a simple version control system
#[derive(Parser)]
#[command(name = "svcs")]
#[command(about = "A simple version control system", long_about = None)]
#[command(version, disable_help_flag = true, disable_help_subcommand = true)]
#[command(allow_external_subcommands = true)]
struct Cli {
    /// Repository directory
    #[arg(long, global = true, default_value = "vcs")]
    vcs_dir: PathBuf,

    /// Output results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the list of commands
    #[arg(long, action = ArgAction::SetTrue)]
    help: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

// Each command reads its first operand only; anything after it is ignored.
#[derive(Subcommand)]
enum Commands {
    /// Get and set a username
    Config {
        /// New username
        #[arg(value_name = "USERNAME", trailing_var_arg = true, allow_hyphen_values = true)]
        username: Vec<String>,
    },

    /// Add a file to the index, or list tracked files
    Add {
        /// File to track
        #[arg(value_name = "PATH", trailing_var_arg = true, allow_hyphen_values = true)]
        path: Vec<PathBuf>,
    },

    /// Show commit logs
    Log {
        #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
        ignored: Vec<String>,
    },

    /// Save changes
    Commit {
        /// Commit message
        #[arg(value_name = "MESSAGE", trailing_var_arg = true, allow_hyphen_values = true)]
        message: Vec<String>,
    },

    /// Restore tracked files to a commit
    Checkout {
        /// Id of the commit to restore
        #[arg(value_name = "COMMIT_ID", trailing_var_arg = true, allow_hyphen_values = true)]
        commit_id: Vec<String>,
    },

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

fn main() {
    let args = normalize_args(std::env::args_os());

    let cli = match Cli::try_parse_from(args.clone()) {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::DisplayVersion => e.exit(),
        Err(e) => {
            // Anything clap cannot make sense of is reported like an unknown command.
            let out = OutputWriter::new(args.iter().any(|arg| arg == "--json"));
            if let Err(e) = cmd_unknown(&out, &rejected_token(&e, &args)) {
                out.write_error(&e, RESULT_FAILED);
                std::process::exit(1);
            }
            return;
        }
    };
    init_tracing(cli.verbose);

    let out = OutputWriter::new(cli.json);
    if let Err(e) = run(cli, &out) {
        out.write_error(&e, RESULT_FAILED);
        std::process::exit(1);
    }
}

/// Lowercase the command name so `Config` and `COMMIT` dispatch like their
/// lowercase forms. Only the first token that is not an option is touched.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    let mut args: Vec<OsString> = args.into_iter().collect();

    let mut i = 1;
    while i < args.len() {
        let Some(arg) = args[i].to_str() else {
            break;
        };
        if arg == "--vcs-dir" {
            i += 2;
            continue;
        }
        if arg.starts_with('-') {
            i += 1;
            continue;
        }

        let lower = arg.to_lowercase();
        if COMMANDS.iter().any(|&(name, _)| name == lower) {
            args[i] = OsString::from(lower);
        }
        break;
    }

    args
}

/// The argument clap rejected, falling back to the first raw argument.
fn rejected_token(err: &clap::Error, args: &[OsString]) -> String {
    match err.get(ContextKind::InvalidArg) {
        Some(ContextValue::String(arg)) => arg.clone(),
        _ => args
            .get(1)
            .map(|arg| arg.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli, out: &OutputWriter) -> Result<()> {
    let command = match cli.command {
        Some(command) if !cli.help => command,
        _ => return cmd_help(out),
    };
    let root = cli.vcs_dir.as_path();

    match command {
        Commands::Config { username } => cmd_config(root, out, first(&username)),
        Commands::Add { path } => match path.first() {
            Some(path) => cmd_add(root, out, path),
            None => cmd_list(root, out),
        },
        Commands::Log { .. } => cmd_log(root, out),
        Commands::Commit { message } => cmd_commit(root, out, first(&message)),
        Commands::Checkout { commit_id } => cmd_checkout(root, out, first(&commit_id)),
        Commands::Unknown(args) => {
            cmd_unknown(out, args.first().map(String::as_str).unwrap_or_default())
        }
    }
}

fn first(values: &[String]) -> Option<&str> {
    values.first().map(String::as_str)
}

/// Open the repository at `root`, with the current directory as working tree.
fn open_repo(root: &Path) -> Result<Repository> {
    let work_dir = std::env::current_dir().context("Failed to determine working directory")?;
    Repository::open(root, &work_dir)
        .with_context(|| format!("Failed to open repository at {}", root.display()))
}

/// Report `err` as a refusal when it is an expected precondition failure,
/// otherwise propagate it with `context`.
fn refuse_or_fail(out: &OutputWriter, err: Error, context: &str) -> Result<()> {
    if !err.is_user_error() {
        return Err(anyhow::Error::new(err).context(context.to_string()));
    }

    out.reject(&refusal_message(&err))
}

fn refusal_message(err: &Error) -> String {
    match err {
        Error::NoUsername => "No username given.".to_string(),
        Error::NoTrackedFiles => "No tracked files.".to_string(),
        Error::CommitNotFound { .. } => "Commit does not exist.".to_string(),
        other => format!("{}.", other),
    }
}

fn cmd_help(out: &OutputWriter) -> Result<()> {
    let data = HelpOutput {
        success: true,
        result_code: RESULT_OK,
        commands: COMMANDS
            .iter()
            .map(|&(name, description)| CommandInfo { name, description })
            .collect(),
    };

    out.write(&data, help_text)
}

fn help_text() -> String {
    let mut text = String::from("These are SVCS commands:\n");
    for (name, description) in COMMANDS {
        text.push_str(&format!("{:<11}{}\n", name, description));
    }
    text
}

fn cmd_unknown(out: &OutputWriter, name: &str) -> Result<()> {
    let message = unknown_command_message(name);
    let data = MessageOutput {
        success: false,
        result_code: RESULT_REJECTED,
        message: message.clone(),
    };
    out.write(&data, || format!("{}\n", message))
}

fn unknown_command_message(name: &str) -> String {
    format!("'{}' is not a SVCS command.", name)
}

fn cmd_config(root: &Path, out: &OutputWriter, username: Option<&str>) -> Result<()> {
    let repo = open_repo(root)?;

    let prompt = || -> svcs_core::Result<String> {
        let interactive = atty::is(atty::Stream::Stdin);
        if !out.is_json() {
            println!("Please, tell me who you are.");
        } else if interactive {
            eprintln!("Please, tell me who you are.");
        }
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        Ok(answer)
    };

    let username = match repo.configure(username, prompt) {
        Ok(username) => username,
        Err(e) => return refuse_or_fail(out, e, "Failed to configure username"),
    };

    let data = ConfigOutput {
        success: true,
        result_code: RESULT_OK,
        username: username.clone(),
    };
    out.write(&data, || format!("The username is {}.\n", username))
}

fn cmd_add(root: &Path, out: &OutputWriter, path: &Path) -> Result<()> {
    let repo = open_repo(root)?;

    let outcome = match repo.add(path) {
        Ok(outcome) => outcome,
        Err(Error::FileNotFound { .. }) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            return out.reject(&format!("Can't find '{}'.", name));
        }
        Err(e) => {
            return refuse_or_fail(out, e, &format!("Failed to add {}", path.display()));
        }
    };

    let data = AddOutput {
        success: true,
        result_code: RESULT_OK,
        name: outcome.name().to_string(),
        already_tracked: matches!(outcome, AddOutcome::AlreadyTracked(_)),
    };
    out.write(&data, || add_text(&outcome))
}

fn add_text(outcome: &AddOutcome) -> String {
    match outcome {
        AddOutcome::Tracked(name) => format!("The file '{}' is tracked.\n", name),
        AddOutcome::AlreadyTracked(name) => format!("The file '{}' is already tracked.\n", name),
    }
}

fn cmd_list(root: &Path, out: &OutputWriter) -> Result<()> {
    let repo = open_repo(root)?;
    let files = repo.tracked().context("Failed to read the index")?;

    let data = TrackedOutput {
        success: true,
        result_code: RESULT_OK,
        files,
    };
    out.write(&data, || tracked_text(&data.files))
}

fn tracked_text(files: &[String]) -> String {
    if files.is_empty() {
        return "Add a file to the index.\n".to_string();
    }
    let mut text = String::from("Tracked files:\n");
    for name in files {
        text.push_str(name);
        text.push('\n');
    }
    text
}

fn cmd_log(root: &Path, out: &OutputWriter) -> Result<()> {
    let repo = open_repo(root)?;

    if out.is_json() {
        let data = LogOutput {
            success: true,
            result_code: RESULT_OK,
            commits: repo.commits().context("Failed to read the commit log")?,
        };
        return out.write(&data, String::new);
    }

    let lines = repo.log_lines().context("Failed to read the commit log")?;
    let mut handle = io::stdout().lock();
    handle.write_all(log_text(lines).as_bytes())?;
    Ok(())
}

/// Log lines for display, or the empty-history notice.
fn log_text<I: Iterator<Item = String>>(lines: I) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(&line);
        text.push('\n');
    }
    if text.is_empty() {
        text.push_str("No commits yet.\n");
    }
    text
}

fn cmd_commit(root: &Path, out: &OutputWriter, message: Option<&str>) -> Result<()> {
    let Some(message) = message else {
        return out.reject(MESSAGE_MISSING);
    };
    let repo = open_repo(root)?;

    let outcome = match repo.commit(message) {
        Ok(outcome) => outcome,
        Err(e) => return refuse_or_fail(out, e, "Failed to commit"),
    };

    let data = CommitOutput {
        success: true,
        result_code: RESULT_OK,
        outcome,
    };
    out.write(&data, || commit_text(&data.outcome).to_string())
}

fn commit_text(outcome: &CommitOutcome) -> &'static str {
    match outcome {
        CommitOutcome::Committed { .. } => "Changes are committed.\n",
        CommitOutcome::NothingToCommit => "Nothing to commit.\n",
    }
}

fn cmd_checkout(root: &Path, out: &OutputWriter, commit_id: Option<&str>) -> Result<()> {
    let Some(commit_id) = commit_id else {
        return out.reject(COMMIT_ID_MISSING);
    };
    let repo = open_repo(root)?;

    let actions = match repo.checkout(commit_id) {
        Ok(actions) => actions,
        Err(e) => {
            return refuse_or_fail(out, e, &format!("Failed to check out {}", commit_id));
        }
    };

    let data = CheckoutOutput {
        success: true,
        result_code: RESULT_OK,
        commit: commit_id.to_string(),
        files: actions
            .into_iter()
            .map(|(name, action)| RestoredFile { name, action })
            .collect(),
    };
    out.write(&data, || format!("Switched to commit {}.\n", commit_id))
}
