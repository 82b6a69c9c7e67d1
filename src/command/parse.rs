//! Turning command-line words into a [`Command`].

use crate::command::Command;
use crate::repo::{RepoError, RepoResult};

impl Command {
    /// Parse `args` (the command name followed by its operands).
    pub fn parse(args: &[String]) -> RepoResult<Command> {
        let (name, operands) = args.split_first().ok_or(RepoError::NoCommand)?;
        let operands: Vec<&str> = operands.iter().map(String::as_str).collect();

        let command = match name.as_str() {
            "init" => {
                expect_operands(&operands, 0)?;
                Command::Init
            }
            "add" => Command::Add {
                path: single(&operands)?,
            },
            "commit" => Command::Commit {
                message: single(&operands)?,
            },
            "rm" => Command::Rm {
                path: single(&operands)?,
            },
            "log" => {
                expect_operands(&operands, 0)?;
                Command::Log
            }
            "global-log" => {
                expect_operands(&operands, 0)?;
                Command::GlobalLog
            }
            "find" => Command::Find {
                message: single(&operands)?,
            },
            "status" => {
                expect_operands(&operands, 0)?;
                Command::Status
            }
            "checkout" => parse_checkout(&operands)?,
            "branch" => Command::Branch {
                name: single(&operands)?,
            },
            "rm-branch" => Command::RmBranch {
                name: single(&operands)?,
            },
            "reset" => Command::Reset {
                commit: single(&operands)?,
            },
            "merge" => Command::Merge {
                branch: single(&operands)?,
            },
            other => return Err(RepoError::UnknownCommand(other.to_string())),
        };

        Ok(command)
    }
}

/// `checkout -- FILE`, `checkout COMMIT -- FILE` or `checkout BRANCH`
fn parse_checkout(operands: &[&str]) -> RepoResult<Command> {
    match operands {
        ["--", path] => Ok(Command::CheckoutFile {
            path: path.to_string(),
        }),
        [commit, "--", path] => Ok(Command::CheckoutFileAt {
            commit: commit.to_string(),
            path: path.to_string(),
        }),
        [branch] if *branch != "--" => Ok(Command::CheckoutBranch {
            branch: branch.to_string(),
        }),
        _ => Err(RepoError::InvalidArguments),
    }
}

fn expect_operands(operands: &[&str], count: usize) -> RepoResult<()> {
    if operands.len() == count {
        Ok(())
    } else {
        Err(RepoError::InvalidArguments)
    }
}

fn single(operands: &[&str]) -> RepoResult<String> {
    expect_operands(operands, 1)?;
    Ok(operands[0].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> RepoResult<Command> {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        Command::parse(&args)
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse(&["init"]).unwrap(), Command::Init);
        assert_eq!(parse(&["global-log"]).unwrap(), Command::GlobalLog);
        assert_eq!(
            parse(&["commit", "a message with spaces"]).unwrap(),
            Command::Commit {
                message: "a message with spaces".into()
            }
        );
        assert_eq!(
            parse(&["rm-branch", "dev"]).unwrap(),
            Command::RmBranch { name: "dev".into() }
        );
    }

    #[test]
    fn test_parse_checkout_forms() {
        assert_eq!(
            parse(&["checkout", "--", "f.txt"]).unwrap(),
            Command::CheckoutFile {
                path: "f.txt".into()
            }
        );
        assert_eq!(
            parse(&["checkout", "abc123", "--", "f.txt"]).unwrap(),
            Command::CheckoutFileAt {
                commit: "abc123".into(),
                path: "f.txt".into()
            }
        );
        assert_eq!(
            parse(&["checkout", "dev"]).unwrap(),
            Command::CheckoutBranch {
                branch: "dev".into()
            }
        );
        assert!(matches!(
            parse(&["checkout", "abc123", "++", "f.txt"]),
            Err(RepoError::InvalidArguments)
        ));
    }

    #[test]
    fn test_parse_errors() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a command.");

        let err = parse(&["push"]).unwrap_err();
        assert_eq!(err.to_string(), "No command with that name exists.");

        let err = parse(&["add"]).unwrap_err();
        assert_eq!(err.to_string(), "Incorrect operands.");

        assert!(matches!(parse(&["status", "extra"]), Err(RepoError::InvalidArguments)));
        assert!(matches!(parse(&["checkout"]), Err(RepoError::InvalidArguments)));
    }
}
