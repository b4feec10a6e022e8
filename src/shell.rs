//! Line-oriented front end: command parsing, messages and the prompt loop.
//!
//! The shell never decides anything about balances. It forwards operations to
//! the [`Session`] and, for rejected records, asks the engine for the reason.

use std::io;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::amount::ParseAmountError;
use crate::engine::{AccountState, Rejection};
use crate::model::{Operation, TransactionKind, TransactionRecord};
use crate::store::{AccountStore, StoreError};
use crate::{Amount, Session};

const PROMPT: &str = "> ";

pub const HELP: &str = "\
Commands:
  deposit <amount>        add money to checking
  withdraw <amount>       take money from checking (overdraft allowed)
  to-savings <amount>     move money from checking to savings
  from-savings <amount>   move money from savings to checking
  balance                 show balances and overdraft allowance
  history [n]             show the last n operations
  help                    show this list
  quit                    leave";

/// A parsed line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Execute(Operation),
    Balance,
    History(Option<usize>),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}', type 'help' for the list")]
    Unknown(String),

    #[error("'{0}' needs an amount")]
    MissingAmount(String),

    #[error("invalid amount: {0}")]
    Amount(#[from] ParseAmountError),

    #[error("invalid history length '{0}'")]
    HistoryLength(String),

    #[error("unexpected argument '{argument}' after '{command}'")]
    UnexpectedArgument { command: String, argument: String },
}

/// Errors that end the prompt loop.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Option<Result<Command, CommandError>> {
    let mut words = line.split_whitespace();
    let name = words.next()?;
    let arg = words.next();

    let lowered = name.to_ascii_lowercase();

    let command = match lowered.as_str() {
        "deposit" => amount_arg(name, arg).map(|a| Command::Execute(Operation::Deposit(a))),
        "withdraw" => amount_arg(name, arg).map(|a| Command::Execute(Operation::Withdrawal(a))),
        "to-savings" => {
            amount_arg(name, arg).map(|a| Command::Execute(Operation::TransferToSavings(a)))
        }
        "from-savings" => {
            amount_arg(name, arg).map(|a| Command::Execute(Operation::TransferFromSavings(a)))
        }
        "balance" => Ok(Command::Balance),
        "history" => match arg {
            None => Ok(Command::History(None)),
            Some(n) => n
                .parse()
                .map(|n| Command::History(Some(n)))
                .map_err(|_| CommandError::HistoryLength(n.to_string())),
        },
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    };

    let extra = match command {
        Ok(Command::Execute(_) | Command::History(_)) => words.next(),
        Ok(_) => arg,
        Err(_) => None,
    };
    Some(match extra {
        Some(argument) => Err(CommandError::UnexpectedArgument {
            command: lowered,
            argument: argument.to_string(),
        }),
        None => command,
    })
}

fn amount_arg(name: &str, arg: Option<&str>) -> Result<Amount, CommandError> {
    let text = arg.ok_or_else(|| CommandError::MissingAmount(name.to_string()))?;
    Ok(text.parse()?)
}

/// Message shown after an operation. `reason` is only consulted for
/// rejected records.
pub fn describe_outcome(record: &TransactionRecord, reason: Option<Rejection>) -> String {
    if record.is_success() {
        let done = match record.kind {
            TransactionKind::Deposit => format!("Deposit of {} completed.", record.amount),
            TransactionKind::Withdrawal => format!("Withdrawal of {} completed.", record.amount),
            TransactionKind::SavingsDeposit => {
                format!("Moved {} to savings.", record.amount)
            }
            TransactionKind::SavingsWithdrawal => {
                format!("Moved {} from savings.", record.amount)
            }
        };
        return match record.savings_balance_after {
            Some(savings) => format!(
                "{done}\nNew balance: {}\nSavings: {savings}",
                record.balance_after
            ),
            None => format!("{done}\nNew balance: {}", record.balance_after),
        };
    }

    match reason {
        Some(Rejection::InvalidAmount(_)) | None => {
            "The amount must be a positive whole number.".to_string()
        }
        Some(Rejection::ExceedsOverdraft { balance, limit, .. }) => format!(
            "{} refused: the amount exceeds your overdraft allowance of {limit}.\nCurrent balance: {balance}",
            refused_label(record.kind)
        ),
        Some(Rejection::InsufficientSavings { savings, .. }) => format!(
            "{} refused: your savings balance is only {savings}.",
            refused_label(record.kind)
        ),
        Some(Rejection::BalanceOverflow(..)) => format!(
            "{} refused: the resulting balance is out of range.",
            refused_label(record.kind)
        ),
    }
}

fn refused_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Deposit => "Deposit",
        TransactionKind::Withdrawal => "Withdrawal",
        TransactionKind::SavingsDeposit | TransactionKind::SavingsWithdrawal => "Transfer",
    }
}

pub fn render_balance(state: &AccountState) -> String {
    format!(
        "Current balance: {}\nSavings: {}\nOverdraft allowed: {}\nMinimum possible balance: {}",
        state.checking_balance,
        state.savings_balance,
        state.overdraft_limit,
        state.floor()
    )
}

pub fn render_record(record: &TransactionRecord) -> String {
    // sign follows the checking balance
    let sign = match record.kind {
        TransactionKind::Deposit | TransactionKind::SavingsWithdrawal => '+',
        TransactionKind::Withdrawal | TransactionKind::SavingsDeposit => '-',
    };
    let status = if record.is_success() { "ok" } else { "rejected" };

    let amount = format!("{sign}{}", record.amount);

    let mut out = format!(
        "{}  {:<18} {amount:<11} balance {:>8}",
        record.timestamp.format("%Y-%m-%d %H:%M"),
        record.kind,
        record.balance_after
    );
    if let Some(savings) = record.savings_balance_after {
        out.push_str(&format!("  savings {savings:>8}"));
    }
    out.push_str(&format!("  {status}"));
    out
}

pub fn render_history(records: &[TransactionRecord]) -> String {
    if records.is_empty() {
        return "No transactions yet.".to_string();
    }
    let mut out = format!("Last {} operation(s):", records.len());
    for record in records {
        out.push('\n');
        out.push_str(&render_record(record));
    }
    out
}

/// Read commands from `input` until `quit` or end of input.
///
/// A failed write to the store ends the loop with an error; nothing after
/// it is attempted.
pub async fn interact<S, R, W>(
    session: &mut Session<S>,
    input: R,
    mut output: W,
    history_limit: usize,
) -> Result<(), ShellError>
where
    S: AccountStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    output.write_all(PROMPT.as_bytes()).await?;
    output.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_command(&line) {
            None => None,
            Some(Ok(Command::Quit)) => break,
            Some(Ok(Command::Help)) => Some(HELP.to_string()),
            Some(Ok(Command::Balance)) => Some(render_balance(session.state())),
            Some(Ok(Command::History(n))) => Some(render_history(
                session.history(n.unwrap_or(history_limit)),
            )),
            Some(Ok(Command::Execute(op))) => {
                let record = session.execute(op).await?;
                let reason = if record.is_success() {
                    None
                } else {
                    session.explain(op)
                };
                Some(describe_outcome(&record, reason))
            }
            Some(Err(e)) => Some(e.to_string()),
        };

        if let Some(reply) = reply {
            output.write_all(reply.as_bytes()).await?;
            output.write_all(b"\n").await?;
        }
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;
    }

    Ok(())
}
