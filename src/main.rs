use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use color_eyre::eyre::eyre;
use tracing_subscriber::EnvFilter;

mod app;
mod candidate;
mod error;
mod keys;
mod menu;
mod prompt;
mod ui;
mod widgets;

use candidate::{parse_candidates, Candidate};
use keys::Tty;
use menu::Action;
use prompt::AlternateScreen;

/// Interactive test runner: pick what to run with a single keystroke
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File listing the tests to choose from, one `group#name` per line
    #[arg(long)]
    candidates: PathBuf,

    /// Exit after the first resolved run instead of returning to the menu
    #[arg(long)]
    once: bool,

    /// Write logs to this file (level taken from ATR_LOG, default "info")
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// What the executor should run, as resolved from the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Plan {
    All,
    Changed,
    Failed,
    Subset(Vec<Candidate>),
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    install_panic_hook();

    let args = Args::parse();

    if let Some(ref log_file) = args.log_file {
        init_logging(log_file)?;
    }

    let input = std::fs::read_to_string(&args.candidates).map_err(|e| {
        eyre!(
            "Failed to read candidates '{}': {}",
            args.candidates.display(),
            e
        )
    })?;
    let candidates = parse_candidates(&input);
    tracing::info!(count = candidates.len(), "loaded candidates");

    let mut tty = Tty::open().map_err(error::Error::TerminalUnavailable)?;
    let mut screen = AlternateScreen;
    let mut stdout = io::stdout();
    menu::print_welcome(&mut stdout)?;

    let mut last: Option<Plan> = None;
    loop {
        menu::print_usage(&mut stdout)?;

        let plan = match menu::action_prompt(&mut tty, &mut stdout)? {
            Action::Quit => return Ok(()),
            Action::RepeatLast => match last {
                Some(ref plan) => plan.clone(),
                None => {
                    writeln!(stdout, "Nothing to repeat yet")?;
                    continue;
                }
            },
            Action::RunSubset => match prompt::prompt(&mut screen, &mut tty, &candidates)? {
                Some(selection) => Plan::Subset(selection.into_iter().cloned().collect()),
                None => {
                    writeln!(stdout, "Exiting...")?;
                    return Ok(());
                }
            },
            Action::RunAll => Plan::All,
            Action::RunChanged => Plan::Changed,
            Action::RunFailed => Plan::Failed,
        };

        print_plan(&mut stdout, &plan)?;
        last = Some(plan);

        if args.once {
            return Ok(());
        }
    }
}

/// Put the terminal back before the panic report is printed.
fn install_panic_hook() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = prompt::restore_terminal();
        hook(info);
    }));
}

fn init_logging(path: &Path) -> color_eyre::Result<()> {
    let file = File::create(path)
        .map_err(|e| eyre!("Failed to open log file '{}': {}", path.display(), e))?;
    let filter = EnvFilter::try_from_env("ATR_LOG").unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the UI, so logs only ever go to the file
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| eyre!("Failed to install logger: {}", e))
}

/// Hand the plan to the executor. For now that is stdout.
fn print_plan<W: Write>(out: &mut W, plan: &Plan) -> io::Result<()> {
    match plan {
        Plan::All => writeln!(out, "Running all tests"),
        Plan::Changed => writeln!(out, "Running changed tests"),
        Plan::Failed => writeln!(out, "Running failed tests"),
        Plan::Subset(selection) => {
            let refs: Vec<&Candidate> = selection.iter().collect();
            writeln!(out, "Running {} selected tests", selection.len())?;
            for label in widgets::candidate_labels(&refs) {
                writeln!(out, "  {label}")?;
            }
            Ok(())
        }
    }
}
