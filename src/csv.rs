use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::{Command, NewTransaction, PayerBalance, Points};

/// Errors that can occur when reading commands or writing balances
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open {path}: {source}")]
    Open { path: String, source: csv::Error },

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{kind}'")]
    UnrecognizedType { line: usize, kind: String },

    #[error("line {line}: {kind} missing {field}")]
    MissingField {
        line: usize,
        kind: &'static str,
        field: &'static str,
    },

    #[error("failed to write csv output: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush csv output: {0}")]
    Flush(#[from] io::Error),
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    payer: Option<String>,
    points: Option<i64>,
    timestamp: Option<DateTime<Utc>>,
}

/// Read batch commands from a csv file with a `type,payer,points,timestamp` header
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let path = path.as_ref();
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| CsvError::Open {
            path: path.display().to_string(),
            source,
        })?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<Command, CsvError> {
    let missing = |kind: &'static str, field: &'static str| CsvError::MissingField {
        line,
        kind,
        field,
    };
    match row.r#type.as_str() {
        "deposit" => {
            let payer = row.payer.ok_or_else(|| missing("deposit", "payer"))?;
            let points = row.points.ok_or_else(|| missing("deposit", "points"))?;
            Ok(Command::Deposit(NewTransaction {
                payer,
                points: Points::new(points),
                timestamp: row.timestamp,
            }))
        }
        "spend" => {
            let points = row.points.ok_or_else(|| missing("spend", "points"))?;
            Ok(Command::Spend {
                points: Points::new(points),
            })
        }
        other => Err(CsvError::UnrecognizedType {
            line,
            kind: other.to_string(),
        }),
    }
}

/// Write payer balances in csv format; the header is written even with no rows
pub fn write_balances<'a, W: io::Write>(
    writer: W,
    balances: impl IntoIterator<Item = &'a PayerBalance>,
) -> Result<(), CsvError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer.write_record(["payer", "points"])?;

    for balance in balances {
        writer.serialize(balance)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn read_all(content: &str) -> Vec<Result<Command, CsvError>> {
        let file = write_csv(content);
        read_commands(file.path()).unwrap().collect()
    }

    #[test]
    fn read_deposit_with_timestamp() {
        let results = read_all(
            "type,payer,points,timestamp\ndeposit,DANNON,300,2020-10-31T10:00:00Z\n",
        );
        assert_eq!(results.len(), 1);

        let command = results.into_iter().next().unwrap().unwrap();
        assert_eq!(
            command,
            Command::Deposit(
                NewTransaction::new("DANNON", 300)
                    .at(Utc.with_ymd_and_hms(2020, 10, 31, 10, 0, 0).unwrap())
            )
        );
    }

    #[test]
    fn read_deposit_without_timestamp() {
        let results = read_all("type,payer,points,timestamp\ndeposit,DANNON,-200,\n");
        let command = results.into_iter().next().unwrap().unwrap();
        assert_eq!(command, Command::Deposit(NewTransaction::new("DANNON", -200)));
    }

    #[test]
    fn read_spend() {
        let results = read_all("type,payer,points,timestamp\nspend,,5000,\n");
        let command = results.into_iter().next().unwrap().unwrap();
        assert_eq!(
            command,
            Command::Spend {
                points: Points::new(5000)
            }
        );
    }

    #[test]
    fn read_with_whitespace() {
        let results = read_all(
            "type, payer, points, timestamp\ndeposit, MILLER COORS, 10000, 2020-11-01T14:00:00Z\n",
        );
        assert_eq!(results.len(), 1);
        match results.into_iter().next().unwrap().unwrap() {
            Command::Deposit(deposit) => assert_eq!(deposit.payer, "MILLER COORS"),
            other => panic!("expected deposit, got {other:?}"),
        }
    }

    #[test]
    fn read_returns_error_for_unknown_type() {
        let results = read_all("type,payer,points,timestamp\nrefund,DANNON,10,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::UnrecognizedType { line: 2, .. }));
    }

    #[test]
    fn read_returns_error_for_missing_points() {
        let results = read_all("type,payer,points,timestamp\ndeposit,DANNON,,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(
            err,
            CsvError::MissingField {
                line: 2,
                field: "points",
                ..
            }
        ));
    }

    #[test]
    fn read_returns_error_for_missing_payer() {
        let results = read_all("type,payer,points,timestamp\ndeposit,,10,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(
            err,
            CsvError::MissingField { field: "payer", .. }
        ));
    }

    #[test]
    fn read_returns_error_for_fractional_points() {
        let results = read_all("type,payer,points,timestamp\ndeposit,DANNON,1.5,\n");
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::Parse { line: 2, .. }));
    }

    #[test]
    fn read_keeps_going_after_a_bad_row() {
        let results = read_all(
            "type,payer,points,timestamp\nrefund,DANNON,10,\ndeposit,DANNON,10,\n",
        );
        assert_eq!(results.len(), 2);
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }

    #[test]
    fn open_missing_file_fails() {
        let result = read_commands("/definitely/not/here.csv");
        assert!(matches!(result, Err(CsvError::Open { .. })));
    }

    #[test]
    fn write_balances_in_order() {
        let balances = vec![
            PayerBalance {
                payer: "DANNON".to_string(),
                points: Points::new(1000),
            },
            PayerBalance {
                payer: "UNILEVER".to_string(),
                points: Points::ZERO,
            },
        ];
        let mut out = Vec::new();
        write_balances(&mut out, &balances).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "payer,points\nDANNON,1000\nUNILEVER,0\n"
        );
    }

    #[test]
    fn write_header_without_balances() {
        let mut out = Vec::new();
        write_balances(&mut out, &Vec::<PayerBalance>::new()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "payer,points\n");
    }
}
