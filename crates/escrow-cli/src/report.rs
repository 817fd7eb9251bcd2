use crate::{config::ConfigError, prompt::InputError};
use cardano_tx_builder::Hash;
use escrow_tx::{AmountError, PreconditionError, SubmitError};
use serde::Serialize;
use std::process::ExitCode;

/// How a command ended, when it did not fail outright.
#[derive(Debug)]
pub enum Outcome {
    Done,
    Submitted(Hash<32>),
    Failed(SubmitError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success = 0,
    SubmissionFailed = 1,
    Precondition = 2,
    Input = 3,
    Other = 4,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

impl Exit {
    /// Find the first error of a known kind along the chain.
    pub fn classify(error: &anyhow::Error) -> Self {
        for cause in error.chain() {
            if cause.is::<PreconditionError>() {
                return Exit::Precondition;
            }
            if cause.is::<ConfigError>() || cause.is::<InputError>() || cause.is::<AmountError>()
            {
                return Exit::Input;
            }
            if cause.is::<SubmitError>() {
                return Exit::SubmissionFailed;
            }
        }
        Exit::Other
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Json {
    Submitted { tx_hash: String },
    Failed { error: String },
    Error { kind: &'static str, error: String },
}

pub fn render_submitted(id: &Hash<32>, json: bool) -> String {
    if json {
        to_json(&Json::Submitted {
            tx_hash: id.to_string(),
        })
    } else {
        format!("transaction successful!\nTxHash : {id}")
    }
}

pub fn render_failed(error: &SubmitError, json: bool) -> String {
    if json {
        to_json(&Json::Failed {
            error: error.to_string(),
        })
    } else {
        format!("Transaction failed : {error}")
    }
}

fn render_error(error: &anyhow::Error, exit: Exit, json: bool) -> String {
    if json {
        to_json(&Json::Error {
            kind: match exit {
                Exit::Precondition => "precondition",
                Exit::Input => "input",
                Exit::SubmissionFailed => "submission",
                Exit::Success | Exit::Other => "other",
            },
            error: format!("{error:#}"),
        })
    } else {
        format!("{error:#}")
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| unreachable!("failed to serialise report? {e}"))
}

/// Print the final word of a run, and turn it into an exit code. Results go to stdout, errors
/// to stderr unless JSON was asked for.
pub fn conclude(outcome: anyhow::Result<Outcome>, json: bool) -> ExitCode {
    let exit = match outcome {
        Ok(Outcome::Done) => Exit::Success,
        Ok(Outcome::Submitted(id)) => {
            println!("{}", render_submitted(&id, json));
            Exit::Success
        }
        Ok(Outcome::Failed(error)) => {
            println!("{}", render_failed(&error, json));
            Exit::SubmissionFailed
        }
        Err(error) => {
            let exit = Exit::classify(&error);
            let message = render_error(&error, exit, json);
            if json {
                println!("{message}");
            } else {
                eprintln!("{message}");
            }
            exit
        }
    };

    ExitCode::from(exit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn submitted_text() {
        let id: Hash<32> = "39a7a284c2a0948189dc45dec670211cd4d72f7b66c5726c08d9b3df11e44d58"
            .parse()
            .unwrap();
        assert_eq!(
            render_submitted(&id, false),
            "transaction successful!\nTxHash : 39a7a284c2a0948189dc45dec670211cd4d72f7b66c5726c08d9b3df11e44d58"
        );
        assert_eq!(
            render_submitted(&id, true),
            r#"{"status":"submitted","tx_hash":"39a7a284c2a0948189dc45dec670211cd4d72f7b66c5726c08d9b3df11e44d58"}"#
        );
    }

    #[test]
    fn failed_text() {
        let error = SubmitError::Rejected(anyhow!("BadInputsUTxO").context("rejected"));
        assert_eq!(
            render_failed(&error, false),
            "Transaction failed : rejected: BadInputsUTxO"
        );
        assert_eq!(
            render_failed(&error, true),
            r#"{"status":"failed","error":"rejected: BadInputsUTxO"}"#
        );
    }

    #[test]
    fn exit_codes() {
        let precondition =
            anyhow::Error::from(PreconditionError::NoCollateral).context("unlock aborted");
        assert_eq!(Exit::classify(&precondition), Exit::Precondition);

        let amount: anyhow::Result<()> =
            Err(AmountError::NotPositive).context("invalid amount of ADA");
        assert_eq!(Exit::classify(&amount.unwrap_err()), Exit::Input);

        let config = anyhow::Error::from(ConfigError::MissingProjectId);
        assert_eq!(Exit::classify(&config), Exit::Input);

        assert_eq!(Exit::classify(&anyhow!("connection reset")), Exit::Other);
    }
}
