//! gitlite - command-line entry point

use std::path::PathBuf;
use std::process::ExitCode;

use gitlite::command;
use gitlite::logging;
use gitlite::repo::RepositoryConfig;

/// What the leading options asked for.
#[derive(Debug, PartialEq)]
enum Invocation {
    /// run the command starting at `args[command_at]`
    Run {
        config: RepositoryConfig,
        verbose: bool,
        command_at: usize,
    },
    Help,
    Version,
}

/// Parse the options that precede the command name.
fn parse_options(args: &[String], mut config: RepositoryConfig) -> Result<Invocation, String> {
    let mut verbose = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-C" => {
                i += 1;
                match args.get(i) {
                    Some(dir) => config = config.work_dir(PathBuf::from(dir)),
                    None => return Err("-C requires a directory".to_string()),
                }
            }
            "-v" | "--verbose" => {
                verbose = true;
            }
            "-h" | "--help" => return Ok(Invocation::Help),
            "--version" => return Ok(Invocation::Version),
            _ => break,
        }
        i += 1;
    }

    Ok(Invocation::Run {
        config,
        verbose,
        command_at: i,
    })
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let (config, verbose, command_at) = match parse_options(&args, RepositoryConfig::from_env()) {
        Ok(Invocation::Run {
            config,
            verbose,
            command_at,
        }) => (config, verbose, command_at),
        Ok(Invocation::Help) => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Invocation::Version) => {
            println!("gitlite v{}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
    };

    logging::init(verbose);

    match command::run(&args[command_at..], &config) {
        Ok(output) => {
            if !output.is_silent() {
                print!("{}", output);
            }
            ExitCode::SUCCESS
        }
        Err(e) if e.is_user_error() => {
            println!("{}", e);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("gitlite - a small version control system");
    println!();
    println!("Usage: gitlite [OPTIONS] <COMMAND> [OPERANDS]");
    println!();
    println!("Options:");
    println!("  -C DIR          Run as if started in DIR (default: $GITLITE_DIR or .)");
    println!("  -v, --verbose   Log debug events to stderr (otherwise $GITLITE_LOG)");
    println!("  -h, --help      Show this help message");
    println!("  --version       Show version");
    println!();
    println!("Commands:");
    println!("  init                         Create a repository here");
    println!("  add FILE                     Stage a file");
    println!("  commit MESSAGE               Commit the staged changes");
    println!("  rm FILE                      Unstage or untrack a file");
    println!("  log                          History of the current branch");
    println!("  global-log                   Every commit ever made");
    println!("  find MESSAGE                 Ids of commits with this message");
    println!("  status                       Branches, staged and unstaged changes");
    println!("  checkout -- FILE             Restore FILE from HEAD");
    println!("  checkout COMMIT -- FILE      Restore FILE from COMMIT");
    println!("  checkout BRANCH              Switch to BRANCH");
    println!("  branch NAME                  Create a branch at HEAD");
    println!("  rm-branch NAME               Delete a branch");
    println!("  reset COMMIT                 Move the current branch to COMMIT");
    println!("  merge BRANCH                 Merge BRANCH into the current branch");
}
