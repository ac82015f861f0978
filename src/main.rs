use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{ErrorKind, StdinLock, Stdout};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use decision_journal::config::{self, Config};
use decision_journal::journal::{list_recent, search, Journal};
use decision_journal::output;
use decision_journal::prompt::Prompter;
use decision_journal::session::Session;
use decision_journal::source::ExternalScorer;
use decision_journal::stderr_buffer::BufferedStderr;

const EXIT_SUCCESS: i32 = 0;
const EXIT_STORAGE: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_CONFIG: i32 = 4;

const MENU_OPTIONS: [&str; 5] = [
    "New decision",
    "Compare two tasks",
    "Reflect on a past decision",
    "Browse history",
    "Exit",
];

type StdioPrompter = Prompter<StdinLock<'static>, Stdout>;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive menu (default if no subcommand)
    Menu,
    /// Record and score a single decision
    Decide {
        /// Ask the configured AI scorer for ratings
        #[arg(long)]
        ai: bool,
    },
    /// Score two tasks side by side
    Compare {
        /// Ask the configured AI scorer for ratings
        #[arg(long)]
        ai: bool,
    },
    /// Record how a past decision turned out
    Reflect,
    /// Print recent journal entries
    History {
        /// Only entries containing this keyword (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,

        /// Maximum number of entries to print
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,

        /// Print whole entries instead of one-line summaries
        #[arg(long)]
        full: bool,
    },
    /// Browse the journal in a full-screen view
    Browse,
    /// Create a config file interactively
    Init,
}

#[derive(Parser, Debug)]
#[command(name = "decision-journal")]
#[command(about = "Score decisions and keep a journal of how they turned out", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/decision-journal/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the journal file (overrides the config)
    #[arg(short, long, global = true)]
    journal: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let command = cli.command.unwrap_or(Commands::Menu);
    let config_path = cli.config.map(PathBuf::from);

    // Init runs before loading, so a broken config can be replaced
    if let Commands::Init = command {
        let mut prompter = Prompter::stdio();
        if let Err(e) = config::run_init_wizard(&mut prompter, config_path) {
            eprintln!("Init failed: {:#}", e);
            std::process::exit(exit_code_for(&e));
        }
        std::process::exit(EXIT_SUCCESS);
    }

    let config = match config::load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let journal = Journal::new(
        cli.journal
            .map(PathBuf::from)
            .unwrap_or_else(|| config.journal_path()),
    );
    tracing::debug!(path = %journal.path().display(), "using journal");

    let result = run(command, &config, &journal).await;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_code_for(&e));
    }
    std::process::exit(EXIT_SUCCESS);
}

async fn run(command: Commands, config: &Config, journal: &Journal) -> Result<()> {
    match command {
        Commands::Menu => run_menu(config, journal).await,
        Commands::Decide { ai } => {
            let mut prompter = Prompter::stdio();
            let mut session = build_session(&mut prompter, journal, config, ai)?;
            session.decide().await.map(|_| ())
        }
        Commands::Compare { ai } => {
            let mut prompter = Prompter::stdio();
            let mut session = build_session(&mut prompter, journal, config, ai)?;
            session.compare().await.map(|_| ())
        }
        Commands::Reflect => {
            let mut prompter = Prompter::stdio();
            let mut session = build_session(&mut prompter, journal, config, false)?;
            session.reflect().await.map(|_| ())
        }
        Commands::History {
            search,
            limit,
            full,
        } => print_history(journal, search.as_deref(), limit, full),
        Commands::Browse => decision_journal::tui::run_browser(journal).await,
        // Handled before config is loaded
        Commands::Init => Ok(()),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "decision_journal=debug"
    } else {
        "decision_journal=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(BufferedStderr)
        .with_target(false)
        .init();
}

/// Closed stdin is an input error; everything else that escapes a flow is storage.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    let input_closed = err.chain().any(|cause| {
        cause
            .downcast_ref::<std::io::Error>()
            .is_some_and(|e| e.kind() == ErrorKind::UnexpectedEof)
    });
    if input_closed {
        EXIT_INPUT
    } else {
        EXIT_STORAGE
    }
}

/// Session over stdio. Uses the AI scorer when asked for on the command line
/// or enabled in config, and says so when it can't be set up.
fn build_session<'a>(
    prompter: &'a mut StdioPrompter,
    journal: &'a Journal,
    config: &Config,
    ai: bool,
) -> Result<Session<'a, StdinLock<'static>, Stdout>> {
    let mut session = Session::new(prompter, journal, &config.scoring)
        .with_colors(output::should_use_colors());

    if ai || config.scorer.enabled {
        match ExternalScorer::from_config(&config.scorer, config.scorer_timeout()) {
            Ok(scorer) => {
                tracing::debug!(model = %config.scorer.model, "AI scorer enabled");
                session = session.with_external(Box::new(scorer));
            }
            Err(e) => {
                session.prompter().say(format!(
                    "AI scoring unavailable ({}). You will rate options yourself.",
                    e
                ))?;
            }
        }
    }
    Ok(session)
}

async fn run_menu(config: &Config, journal: &Journal) -> Result<()> {
    let mut prompter = Prompter::stdio();
    let mut session = build_session(&mut prompter, journal, config, false)?;

    loop {
        let prompter = session.prompter();
        prompter.say("")?;
        prompter.say("Decision Journal")?;
        for (i, option) in MENU_OPTIONS.iter().enumerate() {
            prompter.say(format!("  {}. {}", i + 1, option))?;
        }
        let choice = prompter.ask_choice("Choose an option: ", MENU_OPTIONS.len())?;

        match choice {
            1 => {
                session.decide().await?;
            }
            2 => {
                session.compare().await?;
            }
            3 => {
                session.reflect().await?;
            }
            4 => decision_journal::tui::run_browser(journal).await?,
            _ => {
                session.prompter().say("Goodbye.")?;
                return Ok(());
            }
        }
    }
}

fn print_history(journal: &Journal, keyword: Option<&str>, limit: usize, full: bool) -> Result<()> {
    let entries = journal.load_entries()?;
    tracing::debug!(count = entries.len(), "loaded journal entries");

    let selected: Vec<&String> = match keyword {
        Some(kw) if kw.trim().is_empty() => {
            println!("No keyword entered");
            return Ok(());
        }
        Some(kw) => {
            let found = search(&entries, kw);
            if found.is_empty() {
                println!("No entries match '{}'", kw.trim());
                return Ok(());
            }
            list_recent(&found, limit).into_iter().copied().collect()
        }
        None => list_recent(&entries, limit),
    };

    let use_colors = output::should_use_colors();
    if full {
        println!("{}", output::format_full_entries(&selected, use_colors));
    } else {
        println!("{}", output::format_summary_list(&selected, use_colors));
    }
    Ok(())
}
