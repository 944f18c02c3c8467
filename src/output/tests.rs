//! Tests for output module

use super::*;
use crate::flatten::{flatten_orders, FlatRow, ORDER_COLUMNS};
use arrow::datatypes::DataType;
use bytes::Bytes;
use parquet::basic::Compression;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tempfile::tempdir;

fn sample_rows() -> Vec<FlatRow> {
    let orders = vec![
        json!({
            "order_id": 1,
            "order_date": "2024-01-10",
            "total_amount": 200.50,
            "customer": {
                "customer_id": 101,
                "name": "John Doe",
                "email": "johndoe@example.com",
                "address": "123 Main St"
            },
            "products": [
                {"product_id": "P01", "name": "Wireless Mouse", "category": "Electronics", "price": 25.00, "quantity": 2},
                {"product_id": "P02", "name": "USB Hub", "category": "Electronics", "price": 19.99, "quantity": 1}
            ]
        }),
        json!({
            "order_id": 2,
            "order_date": "2024-01-11",
            "total_amount": 75,
            "customer": {
                "customer_id": 102,
                "name": "Jane Roe",
                "email": "jane@example.com",
                "address": "9 Elm Rd"
            },
            "products": [
                {"product_id": "P07", "name": "Desk Lamp", "category": "Home", "price": 75, "quantity": 1}
            ]
        }),
    ];
    flatten_orders(&orders).unwrap()
}

fn column_type(schema: &arrow::datatypes::Schema, name: &str) -> DataType {
    schema.field_with_name(name).unwrap().data_type().clone()
}

// ============================================================================
// Schema Inference Tests
// ============================================================================

#[test]
fn test_infer_schema_column_order() {
    let schema = infer_schema(&sample_rows());
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(names, ORDER_COLUMNS.to_vec());
    assert!(schema.fields().iter().all(|f| f.is_nullable()));
}

#[test]
fn test_infer_schema_types() {
    let schema = infer_schema(&sample_rows());
    assert_eq!(column_type(&schema, "order_id"), DataType::Int64);
    assert_eq!(column_type(&schema, "order_date"), DataType::Utf8);
    // 200.50 and 75 mix decimals with integers
    assert_eq!(column_type(&schema, "total_amount"), DataType::Float64);
    assert_eq!(column_type(&schema, "customer_id"), DataType::Int64);
    assert_eq!(column_type(&schema, "price"), DataType::Float64);
    assert_eq!(column_type(&schema, "quantity"), DataType::Int64);
}

#[test]
fn test_infer_schema_empty_rows() {
    let schema = infer_schema(&[]);
    assert_eq!(schema.fields().len(), ORDER_COLUMNS.len());
    assert!(schema
        .fields()
        .iter()
        .all(|f| f.data_type() == &DataType::Utf8));
}

#[test]
fn test_infer_schema_conflicting_kinds_become_text() {
    let mut rows = sample_rows();
    rows[2].order_id = json!("ORD-2");
    let schema = infer_schema(&rows);
    assert_eq!(column_type(&schema, "order_id"), DataType::Utf8);

    let batch = rows_to_batch(&rows).unwrap();
    let records = arrow_to_json(&batch).unwrap();
    assert_eq!(records[0]["order_id"], json!("1"));
    assert_eq!(records[2]["order_id"], json!("ORD-2"));
}

#[test]
fn test_infer_schema_all_null_column() {
    let mut rows = sample_rows();
    for row in &mut rows {
        row.address = Value::Null;
    }
    let schema = infer_schema(&rows);
    assert_eq!(column_type(&schema, "address"), DataType::Utf8);
}

#[test]
fn test_infer_schema_nested_value() {
    let mut rows = sample_rows();
    for row in &mut rows {
        row.address = json!({"street": "123 Main St", "zip": 12345});
    }
    let schema = infer_schema(&rows);
    match column_type(&schema, "address") {
        DataType::Struct(fields) => assert_eq!(fields.len(), 2),
        other => panic!("Expected Struct type, got {other:?}"),
    }
}

// ============================================================================
// Rows to Arrow Tests
// ============================================================================

#[test]
fn test_rows_to_batch() {
    let batch = rows_to_batch(&sample_rows()).unwrap();
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 12);
}

#[test]
fn test_rows_to_batch_empty() {
    let batch = rows_to_batch(&[]).unwrap();
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 12);
}

#[test]
fn test_rows_to_batch_matches_rows() {
    let rows = sample_rows();
    let batch = rows_to_batch(&rows).unwrap();
    let records = arrow_to_json(&batch).unwrap();

    assert_eq!(records[0], rows[0].to_json());
    assert_eq!(records[1], rows[1].to_json());
    // Integer 75 widened to 75.0 in a Float64 column
    assert_eq!(records[2]["total_amount"], json!(75.0));
    assert_eq!(records[2]["price"], json!(75.0));
}

#[test]
fn test_rows_to_batch_nulls() {
    let mut rows = sample_rows();
    rows[0].email = Value::Null;
    let batch = rows_to_batch(&rows).unwrap();
    let records = arrow_to_json(&batch).unwrap();
    assert_eq!(records[0]["email"], Value::Null);
    assert_eq!(records[1]["email"], json!("johndoe@example.com"));
}

#[test]
fn test_rows_to_batch_list_values() {
    let mut rows = sample_rows();
    rows[0].category = json!(["Electronics", "Accessories"]);
    rows[1].category = json!([]);
    rows[2].category = Value::Null;

    let batch = rows_to_batch(&rows).unwrap();
    let records = arrow_to_json(&batch).unwrap();
    assert_eq!(records[0]["category"], json!(["Electronics", "Accessories"]));
    assert_eq!(records[1]["category"], json!([]));
    assert_eq!(records[2]["category"], Value::Null);
}

// ============================================================================
// Parquet Writer Config Tests
// ============================================================================

#[test]
fn test_parquet_writer_config_default() {
    let config = ParquetWriterConfig::default();
    assert!(config.is_dictionary_enabled());
    assert!(config.is_statistics_enabled());
    assert_eq!(config.compression(), Compression::SNAPPY);
}

#[test]
fn test_parquet_writer_config_builder() {
    let config = ParquetWriterConfig::new()
        .with_row_group_size(1000)
        .with_dictionary(false)
        .with_statistics(false)
        .uncompressed();

    assert!(!config.is_dictionary_enabled());
    assert!(!config.is_statistics_enabled());
    assert_eq!(config.row_group_size(), 1000);
    assert_eq!(config.compression(), Compression::UNCOMPRESSED);
}

// ============================================================================
// Encode / Decode Tests
// ============================================================================

#[test]
fn test_encode_decode_preserves_table() {
    let rows = sample_rows();
    let batch = rows_to_batch(&rows).unwrap();

    let data = encode_parquet(&batch, &ParquetWriterConfig::default()).unwrap();
    assert_eq!(&data[..4], b"PAR1");

    let (schema, batches) = decode_parquet(data).unwrap();
    assert_eq!(schema.fields(), batch.schema().fields());

    let decoded: Vec<Value> = batches
        .iter()
        .flat_map(|b| arrow_to_json(b).unwrap())
        .collect();
    assert_eq!(decoded, arrow_to_json(&batch).unwrap());
}

#[test]
fn test_encode_decode_with_each_codec() {
    let batch = rows_to_batch(&sample_rows()).unwrap();
    for config in [
        ParquetWriterConfig::new().uncompressed(),
        ParquetWriterConfig::new().zstd(),
        ParquetWriterConfig::new().gzip(),
    ] {
        let data = encode_parquet(&batch, &config).unwrap();
        let (_, batches) = decode_parquet(data).unwrap();
        let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(rows, 3);
    }
}

#[test]
fn test_encode_empty_table_keeps_columns() {
    let batch = rows_to_batch(&[]).unwrap();
    let data = encode_parquet(&batch, &ParquetWriterConfig::default()).unwrap();

    let (schema, batches) = decode_parquet(data).unwrap();
    assert_eq!(schema.fields().len(), 12);
    let rows: usize = batches.iter().map(|b| b.num_rows()).sum();
    assert_eq!(rows, 0);
}

#[test]
fn test_encode_has_no_index_column() {
    let batch = rows_to_batch(&sample_rows()).unwrap();
    let data = encode_parquet(&batch, &ParquetWriterConfig::default()).unwrap();
    let (schema, _) = decode_parquet(data).unwrap();
    assert!(schema.field_with_name("__index_level_0__").is_err());
    assert!(schema.field_with_name("index").is_err());
}

#[test]
fn test_decode_garbage() {
    let result = decode_parquet(Bytes::from_static(b"definitely not parquet"));
    assert!(result.is_err());
}

// ============================================================================
// Parquet File Writer Tests
// ============================================================================

#[test]
fn test_write_batch_to_parquet() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orders.parquet");

    let batch = rows_to_batch(&sample_rows()).unwrap();
    let rows = write_batch_to_parquet(&path, &batch, None).unwrap();
    assert_eq!(rows, 3);

    let data = Bytes::from(std::fs::read(&path).unwrap());
    let (_, batches) = decode_parquet(data).unwrap();
    assert_eq!(batches.iter().map(|b| b.num_rows()).sum::<usize>(), 3);
}

#[test]
fn test_parquet_writer_counts_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("counted.parquet");

    let batch = rows_to_batch(&sample_rows()).unwrap();
    let config = ParquetWriterConfig::default();
    let mut writer = ParquetWriter::new(&path, batch.schema().as_ref(), &config).unwrap();
    writer.write(&batch).unwrap();
    writer.write(&batch).unwrap();
    assert_eq!(writer.rows_written(), 6);
    assert_eq!(writer.close().unwrap(), 6);
}
