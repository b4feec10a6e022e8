use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::amount::ParseAmountError;
use crate::model::{Balance, Operation, TransactionKind, TransactionRecord};

/// Errors that can occur when reading batch files or writing history
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {}: {source}", path.display())]
    Open { path: PathBuf, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized operation type '{op_type}'")]
    UnrecognizedType { line: usize, op_type: String },

    #[error("line {line}: {op_type} missing amount")]
    MissingAmount { line: usize, op_type: String },

    #[error("line {line}: invalid amount: {source}")]
    InvalidAmount {
        line: usize,
        source: ParseAmountError,
    },

    #[error("failed to write history: {0}")]
    Write(csv::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    amount: Option<String>,
}

#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    date: String,
    r#type: &'a str,
    amount: String,
    balance_after: Balance,
    savings_balance_after: Option<Balance>,
    success: bool,
}

/// Read operations from a csv file with a `type,amount` header.
///
/// Amounts are only checked for being numbers; non-positive or fractional
/// amounts are passed through so the engine records their rejection.
pub fn read_operations(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Operation, CsvError>>, CsvError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| CsvError::Open {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok(parse_operations(file))
}

fn parse_operations<R: io::Read>(input: R) -> impl Iterator<Item = Result<Operation, CsvError>> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(input);

    reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;

            let kind = TransactionKind::from_name(&row.r#type).ok_or_else(|| {
                CsvError::UnrecognizedType {
                    line,
                    op_type: row.r#type.clone(),
                }
            })?;

            let text = row
                .amount
                .filter(|text| !text.is_empty())
                .ok_or_else(|| CsvError::MissingAmount {
                    line,
                    op_type: row.r#type.clone(),
                })?;
            let amount = text
                .parse()
                .map_err(|source| CsvError::InvalidAmount { line, source })?;

            Ok(Operation::new(kind, amount))
        })
}

/// Write ledger records in csv format
pub fn write_history<'a>(
    records: impl IntoIterator<Item = &'a TransactionRecord>,
    output: impl io::Write,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(output);

    for record in records {
        let row = OutputRow {
            date: record.timestamp.to_rfc3339(),
            r#type: record.kind.as_str(),
            amount: record.amount.to_string(),
            balance_after: record.balance_after,
            savings_balance_after: record.savings_balance_after,
            success: record.is_success(),
        };
        writer.serialize(&row).map_err(CsvError::Write)?;
    }

    writer.flush().map_err(|e| CsvError::Write(e.into()))
}
