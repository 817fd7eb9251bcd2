use cardano_tx_builder::Hash;
use escrow_tx::{Lovelace, data::Reference};
use std::io::{self, BufRead, Write};

/// Reference number assumed when the question is left unanswered.
pub const DEFAULT_REFERENCE: &str = "17925";

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("no answer given to '{0}'")]
    EndOfInput(String),
    #[error("malformed transaction hash '{0}'; expected 64 hex digits")]
    TransactionHash(String),
}

/// Ask a single question and parse the answer. The question is written without a newline so
/// that the answer is typed next to it. Only the line terminator is stripped from the answer.
pub fn ask<R, W, T>(
    input: &mut R,
    output: &mut W,
    question: &str,
    parse: impl FnOnce(&str) -> anyhow::Result<T>,
) -> anyhow::Result<T>
where
    R: BufRead,
    W: Write,
{
    write!(output, "{question}")?;
    output.flush()?;

    let mut answer = String::new();
    if input.read_line(&mut answer)? == 0 {
        return Err(InputError::EndOfInput(question.trim_end().to_string()).into());
    }

    parse(answer.trim_end_matches(['\n', '\r']))
}

pub fn amount<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> anyhow::Result<Lovelace> {
    ask(input, output, "Amount of ADA: ", |answer| {
        Ok(Lovelace::from_ada_str(answer)?)
    })
}

pub fn transaction_hash<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Hash<32>> {
    ask(input, output, "Transaction hash from lock: ", |answer| {
        parse_transaction_hash(answer)
    })
}

pub fn reference<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Reference> {
    ask(
        input,
        output,
        &format!("Reference Number ({DEFAULT_REFERENCE}): "),
        |answer| {
            if answer.is_empty() {
                Ok(parse_reference(DEFAULT_REFERENCE))
            } else {
                Ok(parse_reference(answer))
            }
        },
    )
}

pub fn parse_transaction_hash(text: &str) -> anyhow::Result<Hash<32>> {
    let text = text.trim();
    if text.len() != 64 {
        return Err(InputError::TransactionHash(text.to_string()).into());
    }
    text.parse()
        .map_err(|_| InputError::TransactionHash(text.to_string()).into())
}

/// Reference numbers are taken verbatim; the validator is the judge of them.
pub fn parse_reference(text: &str) -> Reference {
    Reference::from(text)
}

/// Questions are asked on stderr, so that stdout only ever carries the outcome.
pub fn stdio() -> (io::StdinLock<'static>, io::Stderr) {
    (io::stdin().lock(), io::stderr())
}
