//! The command surface of the `gitlite` binary.
//!
//! Arguments are parsed into a closed [`Command`] enum, executed against a
//! [`Repository`] and turned into a printable [`CommandOutput`].

mod output;
mod parse;

use tracing::debug;

use crate::repo::{RepoError, RepoResult, Repository, RepositoryConfig};

pub use output::CommandOutput;

/// Parse and execute one invocation.
///
/// A repository must exist before operands are checked, so a malformed
/// command outside a repository reports the missing repository first.
pub fn run(args: &[String], config: &RepositoryConfig) -> RepoResult<CommandOutput> {
    match Command::parse(args) {
        Ok(command) => command.execute(config),
        Err(RepoError::InvalidArguments)
            if args.first().is_some_and(|name| name != "init") && !config.layout().exists() =>
        {
            Err(RepoError::NotInitialized(config.work_dir.clone()))
        }
        Err(e) => Err(e),
    }
}

/// A parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// init
    Init,
    /// add FILE
    Add { path: String },
    /// commit MESSAGE
    Commit { message: String },
    /// rm FILE
    Rm { path: String },
    /// log
    Log,
    /// global-log
    GlobalLog,
    /// find MESSAGE
    Find { message: String },
    /// status
    Status,
    /// checkout -- FILE
    CheckoutFile { path: String },
    /// checkout COMMIT -- FILE
    CheckoutFileAt { commit: String, path: String },
    /// checkout BRANCH
    CheckoutBranch { branch: String },
    /// branch NAME
    Branch { name: String },
    /// rm-branch NAME
    RmBranch { name: String },
    /// reset COMMIT
    Reset { commit: String },
    /// merge BRANCH
    Merge { branch: String },
}

impl Command {
    /// The name the command is invoked by.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init => "init",
            Command::Add { .. } => "add",
            Command::Commit { .. } => "commit",
            Command::Rm { .. } => "rm",
            Command::Log => "log",
            Command::GlobalLog => "global-log",
            Command::Find { .. } => "find",
            Command::Status => "status",
            Command::CheckoutFile { .. }
            | Command::CheckoutFileAt { .. }
            | Command::CheckoutBranch { .. } => "checkout",
            Command::Branch { .. } => "branch",
            Command::RmBranch { .. } => "rm-branch",
            Command::Reset { .. } => "reset",
            Command::Merge { .. } => "merge",
        }
    }

    /// Run the command in the repository `config` describes.
    pub fn execute(self, config: &RepositoryConfig) -> RepoResult<CommandOutput> {
        debug!(command = self.name(), "executing");

        if matches!(self, Command::Init) {
            Repository::init(config.clone())?;
            return Ok(CommandOutput::Silent);
        }

        let mut repo = Repository::open(config.clone())?;
        self.execute_in(&mut repo)
    }

    /// Run the command against an open repository.
    pub fn execute_in(self, repo: &mut Repository) -> RepoResult<CommandOutput> {
        match self {
            Command::Init => Err(RepoError::AlreadyInitialized(
                repo.layout().root().to_path_buf(),
            )),
            Command::Add { path } => {
                repo.add(&path)?;
                Ok(CommandOutput::Silent)
            }
            Command::Commit { message } => {
                repo.commit(&message)?;
                Ok(CommandOutput::Silent)
            }
            Command::Rm { path } => {
                repo.remove(&path)?;
                Ok(CommandOutput::Silent)
            }
            Command::Log => Ok(CommandOutput::Log(repo.log()?)),
            Command::GlobalLog => Ok(CommandOutput::Log(repo.global_log()?)),
            Command::Find { message } => Ok(CommandOutput::Ids(repo.find(&message)?)),
            Command::Status => Ok(CommandOutput::Status(repo.status()?)),
            Command::CheckoutFile { path } => {
                repo.checkout_file(&path)?;
                Ok(CommandOutput::Silent)
            }
            Command::CheckoutFileAt { commit, path } => {
                repo.checkout_file_at(&commit, &path)?;
                Ok(CommandOutput::Silent)
            }
            Command::CheckoutBranch { branch } => {
                repo.checkout_branch(&branch)?;
                Ok(CommandOutput::Silent)
            }
            Command::Branch { name } => {
                repo.branch(&name)?;
                Ok(CommandOutput::Silent)
            }
            Command::RmBranch { name } => {
                repo.remove_branch(&name)?;
                Ok(CommandOutput::Silent)
            }
            Command::Reset { commit } => {
                repo.reset(&commit)?;
                Ok(CommandOutput::Silent)
            }
            Command::Merge { branch } => Ok(CommandOutput::Merge(repo.merge(&branch)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run(config: &RepositoryConfig, args: &[&str]) -> RepoResult<CommandOutput> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        super::run(&args, config)
    }

    #[test]
    fn test_requires_init() {
        let dir = TempDir::new().unwrap();
        let config = RepositoryConfig::new(dir.path());

        let err = run(&config, &["status"]).unwrap_err();
        assert!(matches!(err, RepoError::NotInitialized(_)));
        assert_eq!(err.to_string(), "Not in an initialized gitlite directory.");
    }

    #[test]
    fn test_missing_repository_reported_before_operands() {
        let dir = TempDir::new().unwrap();
        let config = RepositoryConfig::new(dir.path());

        let err = run(&config, &["add"]).unwrap_err();
        assert!(matches!(err, RepoError::NotInitialized(_)));

        // init takes no repository, so its operands are checked as usual
        let err = run(&config, &["init", "extra"]).unwrap_err();
        assert!(matches!(err, RepoError::InvalidArguments));

        run(&config, &["init"]).unwrap();
        let err = run(&config, &["add"]).unwrap_err();
        assert_eq!(err.to_string(), "Incorrect operands.");

        let err = run(&config, &["frobnicate"]).unwrap_err();
        assert!(matches!(err, RepoError::UnknownCommand(_)));
    }

    #[test]
    fn test_session() {
        let dir = TempDir::new().unwrap();
        let config = RepositoryConfig::new(dir.path());
        std::fs::write(dir.path().join("f.txt"), "hello").unwrap();

        assert_eq!(run(&config, &["init"]).unwrap(), CommandOutput::Silent);
        run(&config, &["add", "f.txt"]).unwrap();
        run(&config, &["commit", "add f"]).unwrap();

        let log = run(&config, &["log"]).unwrap().to_string();
        assert!(log.starts_with("===\ncommit "));
        assert!(log.contains("\nadd f\n\n===\n"));
        assert!(log.ends_with("initial commit\n\n"));

        let found = run(&config, &["find", "add f"]).unwrap();
        assert!(matches!(found, CommandOutput::Ids(ref ids) if ids.len() == 1));

        let err = run(&config, &["init"]).unwrap_err();
        assert!(matches!(err, RepoError::AlreadyInitialized(_)));
    }

    #[test]
    fn test_merge_output() {
        let dir = TempDir::new().unwrap();
        let config = RepositoryConfig::new(dir.path());
        run(&config, &["init"]).unwrap();
        run(&config, &["branch", "other"]).unwrap();

        let out = run(&config, &["merge", "other"]).unwrap();
        assert_eq!(out.to_string(), "Given branch is an ancestor of the current branch.\n");
    }
}
