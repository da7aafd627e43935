//! XLSX workbook output for tabular documents.

use crate::error::{ConvertError, ConvertResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use docparse_core::{Row, Table};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;
use std::collections::HashSet;

const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;

/// Sheet name for the table at zero-based `index`.
pub fn sheet_name(index: usize) -> String {
    format!("Table {}", index + 1)
}

/// Column names for a table: every row key, in order of first appearance.
pub fn table_columns(table: &Table) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for key in table.iter().flat_map(|row| row.keys()) {
        if seen.insert(key.as_str()) {
            columns.push(key.as_str());
        }
    }

    columns
}

/// Build an XLSX workbook with one sheet per table, in table order.
pub fn build_workbook(tables: &[Table]) -> ConvertResult<Vec<u8>> {
    let mut workbook = Workbook::new();

    for (index, table) in tables.iter().enumerate() {
        let columns = table_columns(table);
        if columns.len() > MAX_COLUMNS {
            return Err(ConvertError::TooManyColumns {
                table: index + 1,
                columns: columns.len(),
            });
        }
        if table.len() + 1 > MAX_ROWS {
            return Err(ConvertError::TooManyRows {
                table: index + 1,
                rows: table.len(),
            });
        }

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(index))?;
        write_table(worksheet, &columns, table)?;
    }

    Ok(workbook.save_to_buffer()?)
}

/// Build the workbook and encode it as standard base64.
pub fn encode_workbook(tables: &[Table]) -> ConvertResult<String> {
    let bytes = build_workbook(tables)?;
    Ok(STANDARD.encode(bytes))
}

fn write_table(worksheet: &mut Worksheet, columns: &[&str], table: &Table) -> ConvertResult<()> {
    if columns.is_empty() {
        return Ok(());
    }

    for (col, name) in columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (r, row) in table.iter().enumerate() {
        let row_num = (r + 1) as u32;
        for (col, name) in columns.iter().enumerate() {
            write_cell(worksheet, row_num, col as u16, row, name)?;
        }
    }

    Ok(())
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, values: &Row, key: &str) -> ConvertResult<()> {
    match values.get(key) {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) => {
            worksheet.write_string(row, col, s.as_str())?;
        }
        Some(Value::Bool(b)) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => {
                worksheet.write_number(row, col, f)?;
            }
            None => {
                worksheet.write_string(row, col, n.to_string())?;
            }
        },
        // Nested values are kept as their JSON text.
        Some(nested) => {
            worksheet.write_string(row, col, nested.to_string())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Data, Reader, Xlsx};
    use serde_json::json;
    use std::io::Cursor;

    fn tables(value: Value) -> Vec<Table> {
        serde_json::from_value(value).unwrap()
    }

    fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        Xlsx::new(Cursor::new(bytes)).unwrap()
    }

    fn string(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_sheet_names() {
        assert_eq!(sheet_name(0), "Table 1");
        assert_eq!(sheet_name(11), "Table 12");
    }

    #[test]
    fn test_columns_union_in_first_seen_order() {
        let t = tables(json!([[{"B": 1, "A": 2}, {"C": 3, "A": 4}]]));
        assert_eq!(table_columns(&t[0]), vec!["B", "A", "C"]);
    }

    #[test]
    fn test_single_table_roundtrip() {
        let encoded = encode_workbook(&tables(json!([[{"A": "1", "B": "2"}]]))).unwrap();
        let bytes = STANDARD.decode(encoded).unwrap();

        let mut workbook = open(bytes);
        assert_eq!(workbook.sheet_names(), vec!["Table 1".to_string()]);

        let range = workbook.worksheet_range("Table 1").unwrap();
        let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
        assert_eq!(
            rows,
            vec![
                vec![string("A"), string("B")],
                vec![string("1"), string("2")],
            ]
        );
    }

    #[test]
    fn test_multiple_tables_keep_order_and_types() {
        let input = tables(json!([
            [{"name": "alpha", "count": 3, "ok": true}],
            [],
            [{"x": null, "y": [1, 2]}, {"x": 1.5}]
        ]));

        let mut workbook = open(build_workbook(&input).unwrap());
        assert_eq!(
            workbook.sheet_names(),
            vec!["Table 1".to_string(), "Table 2".to_string(), "Table 3".to_string()]
        );

        let first = workbook.worksheet_range("Table 1").unwrap();
        assert_eq!(first.get_value((1, 0)), Some(&string("alpha")));
        assert_eq!(first.get_value((1, 1)), Some(&Data::Float(3.0)));
        assert_eq!(first.get_value((1, 2)), Some(&Data::Bool(true)));

        let second = workbook.worksheet_range("Table 2").unwrap();
        assert!(second.is_empty());

        let third = workbook.worksheet_range("Table 3").unwrap();
        assert_eq!(third.get_value((0, 0)), Some(&string("x")));
        assert_eq!(third.get_value((1, 1)), Some(&string("[1,2]")));
        assert_eq!(third.get_value((2, 0)), Some(&Data::Float(1.5)));
    }

    #[test]
    fn test_oversized_cell_is_an_error() {
        let long = "x".repeat(40_000);
        let input = tables(json!([[{"A": long}]]));
        assert!(matches!(build_workbook(&input), Err(ConvertError::Workbook(_))));
    }
}
