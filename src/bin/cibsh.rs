//! Command-line entry point for cibsh.
//!
//! Usage:
//!   cibsh                                   - read commands from stdin
//!   cibsh -f FILE                           - run a command file ('-' for stdin)
//!   cibsh configure primitive p1 Dummy      - run one command and exit
//!   cibsh configure                         - enter a level, then read from stdin
//!
//! Exit status: 0 on success, 1 if any command failed, 2 if a command file
//! could not be opened.

use std::fs::File;
use std::io::{self, BufReader};

use clap::{Arg, ArgAction, Command};
use crossterm::tty::IsTty;
use tracing_subscriber::EnvFilter;

use cibsh::config::ShellConfig;
use cibsh::render::OutputFormat;
use cibsh::schema::default_schema;
use cibsh::shell::{run_lines, NullNotifier, Outcome, Session};

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = Command::new("cibsh")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Command shell for a cluster configuration base")
        .arg(
            Arg::new("display")
                .long("display")
                .short('D')
                .value_name("MODE")
                .help("Output mode: plain, color or uppercase (default: color on a tty)"),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .short('f')
                .value_name("FILE")
                .help("Run commands from FILE ('-' for stdin) before anything else"),
        )
        .arg(
            Arg::new("wait")
                .long("wait")
                .short('w')
                .action(ArgAction::SetTrue)
                .help("Wait for the cluster transition to settle after each commit"),
        )
        .arg(
            Arg::new("force")
                .long("force")
                .short('F')
                .action(ArgAction::SetTrue)
                .help("Proceed without confirmation prompts"),
        )
        .arg(
            Arg::new("skill-level")
                .long("skill-level")
                .value_name("LEVEL")
                .help("Active skill level: operator, administrator or expert"),
        )
        .arg(
            Arg::new("command")
                .num_args(0..)
                .trailing_var_arg(true)
                .help("A single command line to execute"),
        )
        .get_matches();

    let output = match matches.get_one::<String>("display") {
        Some(mode) => match mode.parse::<OutputFormat>() {
            Ok(fmt) => fmt,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return 1;
            }
        },
        None if io::stdout().is_tty() => OutputFormat::Color,
        None => OutputFormat::Plain,
    };
    let skill = match matches.get_one::<String>("skill-level") {
        Some(level) => match level.parse() {
            Ok(level) => level,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return 1;
            }
        },
        None => ShellConfig::default().skill,
    };

    let words: Vec<String> = matches
        .get_many::<String>("command")
        .map(|vals| vals.cloned().collect())
        .unwrap_or_default();
    let file = matches.get_one::<String>("file");
    let interactive = words.is_empty() && file.is_none() && io::stdin().is_tty();

    let config = ShellConfig {
        skill,
        wait: matches.get_flag("wait"),
        force: matches.get_flag("force"),
        output,
        batch: !interactive,
        interactive,
        ..ShellConfig::default()
    };

    let mut notifier = NullNotifier;
    let mut session = Session::new(config, default_schema(), &mut notifier);
    let mut status = 0;

    if let Some(path) = file {
        status = if path == "-" {
            run_lines(&mut session, io::stdin().lock())
        } else {
            match File::open(path) {
                Ok(f) => run_lines(&mut session, BufReader::new(f)),
                Err(e) => {
                    eprintln!("ERROR: cannot open {}: {}", path, e);
                    return 2;
                }
            }
        };
    }

    if !words.is_empty() {
        let line = words.join(" ");
        match session.dispatch_line(&line) {
            Ok(Outcome::Continue(Some(text))) => println!("{}", text),
            Ok(Outcome::Quit) => return status,
            Ok(_) => {}
            Err(e) => {
                eprintln!("ERROR: {}", e);
                return 1;
            }
        }
        if session.depth() == 1 {
            return status;
        }
        // the arguments only entered a level; keep reading commands there
        return status.max(run_lines(&mut session, io::stdin().lock()));
    }

    if file.is_none() {
        status = run_lines(&mut session, io::stdin().lock());
    }
    status
}
