use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use thiserror::Error;

use crate::amount::AmountParseError;
use crate::model::{Command, ProductListing, ReserveReport};
use crate::{Amount, Engine};

/// Errors that can occur when reading a command script
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open script: {0}")]
    Open(csv::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command '{command}'")]
    UnrecognizedCommand { line: usize, command: String },

    #[error("line {line}: {command} missing {field}")]
    MissingField {
        line: usize,
        command: String,
        field: &'static str,
    },

    #[error("line {line}: {source}")]
    InvalidAmount {
        line: usize,
        source: AmountParseError,
    },

    #[error("line {line}: invalid product index '{value}'")]
    InvalidIndex { line: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    command: String,
    arg: Option<String>,
    price: Option<String>,
    quantity: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ProductRow {
    index: usize,
    name: String,
    price: String,
    stock: u32,
}

#[derive(Debug, Serialize)]
struct CoinRow {
    denomination: String,
    count: u32,
}

#[derive(Debug, Serialize)]
struct SummaryRow {
    balance: String,
    profit: String,
    inserted: String,
}

/// Read commands from a csv script with header `command,arg,price,quantity`
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<Command, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;

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
    let command = row.command.to_lowercase();
    let require = |value: Option<String>, field: &'static str| {
        value
            .filter(|v| !v.is_empty())
            .ok_or_else(|| CsvError::MissingField {
                line,
                command: command.clone(),
                field,
            })
    };
    let amount = |value: String| {
        value
            .parse::<Amount>()
            .map_err(|source| CsvError::InvalidAmount { line, source })
    };
    let index = |value: String| {
        value
            .parse::<usize>()
            .map_err(|_| CsvError::InvalidIndex { line, value })
    };

    match command.as_str() {
        "add" => Ok(Command::AddProduct {
            name: require(row.arg, "name")?,
            price: amount(require(row.price, "price")?)?,
            quantity: row.quantity.ok_or_else(|| CsvError::MissingField {
                line,
                command: command.clone(),
                field: "quantity",
            })?,
        }),
        "list" => Ok(Command::ListProducts),
        "insert" => Ok(Command::InsertCoin(amount(require(row.arg, "coin")?)?)),
        "select" => Ok(Command::SelectProduct(index(require(row.arg, "index")?)?)),
        "cancel" => Ok(Command::Cancel),
        "auth" => Ok(Command::Authenticate(require(row.arg, "password")?)),
        "logout" => Ok(Command::Logout),
        "coins" => Ok(Command::ListCoins),
        "restock" => Ok(Command::Restock {
            index: index(require(row.arg, "index")?)?,
            // a missing quantity is rejected by the engine like a zero one
            quantity: row.quantity.unwrap_or(0),
        }),
        "collect" => Ok(Command::Collect),
        _ => Err(CsvError::UnrecognizedCommand {
            line,
            command: row.command,
        }),
    }
}

/// Write the catalog as csv
pub fn write_products(
    writer: impl io::Write,
    products: impl IntoIterator<Item = ProductListing>,
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for product in products {
        writer.serialize(ProductRow {
            index: product.index,
            name: product.name,
            price: product.price.to_string(),
            stock: product.stock,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the coin reserve as csv, largest denomination first
pub fn write_reserve(writer: impl io::Write, report: &ReserveReport) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for &(denomination, count) in &report.coins {
        writer.serialize(CoinRow {
            denomination: denomination.to_string(),
            count,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the money totals of the machine as a one-row csv
pub fn write_summary(writer: impl io::Write, engine: &Engine) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.serialize(SummaryRow {
        balance: engine.total_balance().to_string(),
        profit: engine.profit().to_string(),
        inserted: engine.inserted_amount().to_string(),
    })?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn read(content: &str) -> Vec<Result<Command, CsvError>> {
        let file = write_csv(content);
        read_commands(file.path()).unwrap().collect()
    }

    const HEADER: &str = "command,arg,price,quantity\n";

    #[test]
    fn read_customer_commands() {
        let results = read(&format!(
            "{HEADER}insert,100,,\nselect,2,,\ncancel,,,\nlist,,,\n"
        ));
        let commands: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            commands,
            vec![
                Command::InsertCoin(Amount::from_major(100)),
                Command::SelectProduct(2),
                Command::Cancel,
                Command::ListProducts,
            ]
        );
    }

    #[test]
    fn read_admin_commands() {
        let results = read(&format!(
            "{HEADER}auth,admin123,,\nrestock,1,,4\ncoins,,,\ncollect,,,\nlogout,,,\n"
        ));
        let commands: Vec<_> = results.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            commands,
            vec![
                Command::Authenticate("admin123".to_string()),
                Command::Restock {
                    index: 1,
                    quantity: 4
                },
                Command::ListCoins,
                Command::Collect,
                Command::Logout,
            ]
        );
    }

    #[test]
    fn read_add_product() {
        let results = read(&format!("{HEADER}add,Water,30.50,6\n"));
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::AddProduct {
                name: "Water".to_string(),
                price: Amount::from_minor(3_050),
                quantity: 6,
            }
        );
    }

    #[test]
    fn read_with_whitespace() {
        let results = read("command, arg, price, quantity\n insert , 5 , , \n");
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &Command::InsertCoin(Amount::from_major(5))
        );
    }

    #[test]
    fn read_returns_error_for_unknown_command() {
        let results = read(&format!("{HEADER}refill,1,,\n"));
        let err = results[0].as_ref().unwrap_err();
        assert!(matches!(err, CsvError::UnrecognizedCommand { line: 2, .. }));
    }

    #[test]
    fn read_returns_error_for_missing_coin() {
        let results = read(&format!("{HEADER}cancel,,,\ninsert,,,\n"));
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(matches!(
            err,
            CsvError::MissingField {
                line: 3,
                field: "coin",
                ..
            }
        ));
    }

    #[test]
    fn read_returns_error_for_bad_values() {
        let results = read(&format!("{HEADER}insert,1.234,,\nselect,two,,\n"));
        assert!(matches!(
            results[0].as_ref().unwrap_err(),
            CsvError::InvalidAmount { line: 2, .. }
        ));
        assert!(matches!(
            results[1].as_ref().unwrap_err(),
            CsvError::InvalidIndex { line: 3, .. }
        ));
    }

    #[test]
    fn read_missing_file_fails() {
        assert!(matches!(
            read_commands("does/not/exist.csv"),
            Err(CsvError::Open(_))
        ));
    }

    #[test]
    fn write_catalog_and_reserve() {
        let coins = [(Amount::from_major(5), 2), (Amount::from_major(10), 1)];
        let mut engine = Engine::new("pw", coins);
        engine.add_product("Gum", Amount::from_major(5), 3).unwrap();

        let mut out = Vec::new();
        write_products(&mut out, engine.list_products()).unwrap();
        write_reserve(&mut out, &engine.list_coin_reserve()).unwrap();
        write_summary(&mut out, &engine).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "index,name,price,stock",
                "1,Gum,5.00,3",
                "denomination,count",
                "10.00,1",
                "5.00,2",
                "balance,profit,inserted",
                "20.00,0.00,0.00",
            ]
        );
    }
}
