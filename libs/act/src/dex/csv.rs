//! CSV round trip for a DEX table: two header rows ("Key,..." column names,
//! "Type,..." column types) followed by one data row per table row.

use act_types::wire::{Cell, ColumnDescriptor, Row, TableUpdate, VariantType, WireVariantValue};
use thiserror::Error;

use super::query::{DexColumn, DexRow};

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("csv error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("expected a header row starting with \"Key\"")]
    MissingKeyHeader,

    #[error("expected a header row starting with \"Type\"")]
    MissingTypeHeader,

    #[error("column name row and type row have different lengths")]
    HeaderLengthMismatch,
}

fn type_name(kind: VariantType) -> &'static str {
    match kind {
        VariantType::Unknown => "VAR_UNKNOWN",
        VariantType::Double => "VAR_DOUBLE",
        VariantType::Int32 => "VAR_INT32",
        VariantType::Price => "VAR_PRICE",
        VariantType::String => "VAR_STRING",
        VariantType::Quantity => "VAR_QUANTITY",
    }
}

fn parse_type_name(name: &str) -> VariantType {
    match name {
        "VAR_DOUBLE" => VariantType::Double,
        "VAR_INT32" => VariantType::Int32,
        "VAR_PRICE" => VariantType::Price,
        "VAR_STRING" => VariantType::String,
        "VAR_QUANTITY" => VariantType::Quantity,
        _ => VariantType::Unknown,
    }
}

/// Render a table's schema and rows as CSV.
pub fn to_csv(columns: &[DexColumn], rows: &[DexRow]) -> Result<String, CsvError> {
    let mut writer = ::csv::WriterBuilder::new().from_writer(Vec::new());

    let mut name_row = vec!["Key".to_string()];
    name_row.extend(columns.iter().map(|c| c.name.clone()));
    writer.write_record(&name_row)?;

    let mut type_row = vec!["Type".to_string()];
    type_row.extend(columns.iter().map(|c| type_name(c.kind).to_string()));
    writer.write_record(&type_row)?;

    for row in rows {
        let mut record = vec![row.key.key.clone()];
        record.extend(row.cells.iter().map(|cell| cell.value.as_str()));
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| CsvError::Csv(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse CSV back into a `TableUpdate` ready to send as a DEX `update_table`
/// request. Cell values are always encoded as `VariantValue::String` on the
/// wire; the server is expected to coerce by the column's declared type.
pub fn from_csv(input: &str) -> Result<TableUpdate, CsvError> {
    let mut reader = ::csv::ReaderBuilder::new().has_headers(false).from_reader(input.as_bytes());
    let mut records = reader.records();

    let name_row = records.next().ok_or(CsvError::MissingKeyHeader)??;
    if name_row.get(0) != Some("Key") {
        return Err(CsvError::MissingKeyHeader);
    }
    let type_row = records.next().ok_or(CsvError::MissingTypeHeader)??;
    if type_row.get(0) != Some("Type") {
        return Err(CsvError::MissingTypeHeader);
    }
    if name_row.len() != type_row.len() {
        return Err(CsvError::HeaderLengthMismatch);
    }

    let column_descriptor: Vec<ColumnDescriptor> = name_row
        .iter()
        .skip(1)
        .zip(type_row.iter().skip(1))
        .map(|(name, type_name)| ColumnDescriptor {
            name: name.to_string(),
            r#type: parse_type_name(type_name) as i32,
            is_vector: false,
            can_write: true,
        })
        .collect();

    let mut row = Vec::new();
    for record in records {
        let record = record?;
        let key = record.get(0).unwrap_or_default().to_string();
        let cell: Vec<Cell> = record
            .iter()
            .skip(1)
            .enumerate()
            .map(|(column_number, value)| Cell {
                column_number: column_number as u32,
                value: Some(WireVariantValue {
                    var_string: Some(value.to_string()),
                    ..Default::default()
                }),
                value_vector: vec![],
            })
            .collect();
        row.push(Row { key, contexts: String::new(), row_number: None, cell });
    }

    Ok(TableUpdate { column_descriptor, row })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dex::query::{DexCell, DexRowKey};
    use act_types::variant::VariantValue;

    #[test]
    fn round_trips_a_simple_table() {
        let columns = vec![DexColumn { name: "bid".into(), kind: VariantType::Price, is_vector: false, can_write: false }];
        let rows = vec![DexRow {
            key: DexRowKey { key: "EURUSD".into(), contexts: String::new() },
            row_number: None,
            cells: vec![DexCell { value: VariantValue::String("1.2345".into()), update_count: 1 }],
        }];

        let csv = to_csv(&columns, &rows).unwrap();
        assert!(csv.starts_with("Key,bid"));
        assert!(csv.contains("Type,VAR_PRICE"));
        assert!(csv.contains("EURUSD,1.2345"));

        let table_update = from_csv(&csv).unwrap();
        assert_eq!(table_update.column_descriptor.len(), 1);
        assert_eq!(table_update.column_descriptor[0].name, "bid");
        assert_eq!(table_update.row.len(), 1);
        assert_eq!(table_update.row[0].key, "EURUSD");
    }

    #[test]
    fn rejects_missing_key_header() {
        let err = from_csv("Foo,bid\nType,Price\n").unwrap_err();
        assert!(matches!(err, CsvError::MissingKeyHeader));
    }
}
