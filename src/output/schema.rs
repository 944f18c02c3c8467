//! Flattened rows to Arrow conversion
//!
//! Column types are inferred from the values that actually occur in each
//! column, then the rows are materialized into a single RecordBatch whose
//! columns follow `ORDER_COLUMNS`.

use crate::error::{Error, Result};
use crate::flatten::{FlatRow, ORDER_COLUMNS};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float64Array, Int64Array, ListArray, NullArray, StringArray,
    StructArray,
};
use arrow::buffer::OffsetBuffer;
use arrow::datatypes::{DataType, Field, Fields, Schema};
use arrow::record_batch::RecordBatch;
use serde_json::Value;
use std::sync::Arc;

/// Infer the Arrow schema for a set of flattened rows
///
/// Every column is nullable. A column with no non-null values, which is
/// every column when there are no rows, is typed `Utf8`.
pub fn infer_schema(rows: &[FlatRow]) -> Schema {
    let fields: Vec<Field> = ORDER_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type = rows
                .iter()
                .map(|row| infer_type(row.values()[idx]))
                .fold(DataType::Null, |acc, t| merge_types(&acc, &t));
            let data_type = if data_type == DataType::Null {
                DataType::Utf8
            } else {
                data_type
            };
            Field::new(*name, data_type, true)
        })
        .collect();

    Schema::new(fields)
}

/// Convert flattened rows to an Arrow RecordBatch
pub fn rows_to_batch(rows: &[FlatRow]) -> Result<RecordBatch> {
    let schema = Arc::new(infer_schema(rows));

    if rows.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(ORDER_COLUMNS.len());
    for (idx, field) in schema.fields().iter().enumerate() {
        let values: Vec<Option<&Value>> = rows
            .iter()
            .map(|row| Some(row.values()[idx]).filter(|v| !v.is_null()))
            .collect();
        columns.push(build_array(&values, field.data_type())?);
    }

    RecordBatch::try_new(schema, columns).map_err(|e| Error::Output {
        message: format!("Failed to create RecordBatch: {e}"),
    })
}

/// Infer Arrow DataType from a JSON value
fn infer_type(value: &Value) -> DataType {
    match value {
        Value::Null => DataType::Null,
        Value::Bool(_) => DataType::Boolean,
        Value::Number(n) => {
            if n.is_i64() {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        Value::String(_) => DataType::Utf8,
        Value::Array(arr) => {
            let element_type = arr
                .iter()
                .map(infer_type)
                .fold(DataType::Null, |acc, t| merge_types(&acc, &t));
            DataType::List(Arc::new(Field::new("item", element_type, true)))
        }
        Value::Object(obj) => {
            let fields: Vec<Field> = obj
                .iter()
                .map(|(k, v)| Field::new(k, infer_type(v), true))
                .collect();
            DataType::Struct(Fields::from(fields))
        }
    }
}

/// Merge two data types into a compatible type
fn merge_types(type1: &DataType, type2: &DataType) -> DataType {
    match (type1, type2) {
        (a, b) if a == b => a.clone(),

        // Null can merge with anything
        (DataType::Null, other) | (other, DataType::Null) => other.clone(),

        // Mixed integers and decimals widen to Float64
        (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
            DataType::Float64
        }

        (DataType::List(a), DataType::List(b)) => {
            let item = merge_types(a.data_type(), b.data_type());
            DataType::List(Arc::new(Field::new("item", item, true)))
        }

        // Anything else is rendered as text
        _ => DataType::Utf8,
    }
}

/// Build an Arrow array from JSON values
fn build_array(values: &[Option<&Value>], data_type: &DataType) -> Result<ArrayRef> {
    match data_type {
        DataType::Null => Ok(Arc::new(NullArray::new(values.len()))),

        DataType::Boolean => {
            let arr: BooleanArray = values.iter().map(|v| v.and_then(Value::as_bool)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Int64 => {
            let arr: Int64Array = values.iter().map(|v| v.and_then(Value::as_i64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Float64 => {
            let arr: Float64Array = values.iter().map(|v| v.and_then(Value::as_f64)).collect();
            Ok(Arc::new(arr))
        }

        DataType::Utf8 => {
            let arr: StringArray = values
                .iter()
                .map(|v| {
                    v.map(|v| match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                })
                .collect();
            Ok(Arc::new(arr))
        }

        DataType::List(field) => build_list_array(values, field),

        DataType::Struct(fields) => build_struct_array(values, fields),

        other => Err(Error::output(format!("Unsupported column type {other}"))),
    }
}

/// Build a list array from JSON arrays
fn build_list_array(values: &[Option<&Value>], field: &Arc<Field>) -> Result<ArrayRef> {
    let mut all_items: Vec<Option<&Value>> = Vec::new();
    let mut offsets: Vec<i32> = vec![0];

    for value in values {
        if let Some(Value::Array(arr)) = value {
            all_items.extend(arr.iter().map(|item| Some(item).filter(|v| !v.is_null())));
        }
        let offset = i32::try_from(all_items.len())
            .map_err(|_| Error::output("Array too large for i32 offset"))?;
        offsets.push(offset);
    }

    let items_array = build_array(&all_items, field.data_type())?;
    let offset_buffer = OffsetBuffer::new(offsets.into());
    let nulls = values.iter().map(Option::is_some).collect::<Vec<_>>();

    let list_array = ListArray::try_new(
        Arc::clone(field),
        offset_buffer,
        items_array,
        Some(nulls.into()),
    )?;
    Ok(Arc::new(list_array))
}

/// Build a struct array from JSON objects
fn build_struct_array(values: &[Option<&Value>], fields: &Fields) -> Result<ArrayRef> {
    let mut child_arrays: Vec<ArrayRef> = Vec::with_capacity(fields.len());

    for field in fields {
        let child_values: Vec<Option<&Value>> = values
            .iter()
            .map(|v| {
                v.and_then(|v| v.as_object())
                    .and_then(|obj| obj.get(field.name()))
                    .filter(|v| !v.is_null())
            })
            .collect();

        child_arrays.push(build_array(&child_values, field.data_type())?);
    }

    let nulls = values.iter().map(Option::is_some).collect::<Vec<_>>();
    let struct_array = StructArray::try_new(fields.clone(), child_arrays, Some(nulls.into()))?;
    Ok(Arc::new(struct_array))
}

/// Convert an Arrow RecordBatch to JSON records
///
/// Returns one JSON object per row, keyed by column name.
pub fn arrow_to_json(batch: &RecordBatch) -> Result<Vec<Value>> {
    let schema = batch.schema();
    let mut records = Vec::with_capacity(batch.num_rows());

    for row_idx in 0..batch.num_rows() {
        let mut record = serde_json::Map::new();

        for (col_idx, field) in schema.fields().iter().enumerate() {
            let value = array_value_to_json(batch.column(col_idx).as_ref(), row_idx)?;
            record.insert(field.name().clone(), value);
        }

        records.push(Value::Object(record));
    }

    Ok(records)
}

/// Convert a single array element to JSON
fn array_value_to_json(array: &dyn Array, row: usize) -> Result<Value> {
    if array.is_null(row) {
        return Ok(Value::Null);
    }

    match array.data_type() {
        DataType::Null => Ok(Value::Null),

        DataType::Boolean => Ok(Value::Bool(downcast::<BooleanArray>(array)?.value(row))),

        DataType::Int64 => Ok(Value::Number(
            downcast::<Int64Array>(array)?.value(row).into(),
        )),

        DataType::Float64 => {
            let val = downcast::<Float64Array>(array)?.value(row);
            Ok(serde_json::Number::from_f64(val).map_or(Value::Null, Value::Number))
        }

        DataType::Utf8 => Ok(Value::String(
            downcast::<StringArray>(array)?.value(row).to_string(),
        )),

        DataType::List(_) => {
            let values = downcast::<ListArray>(array)?.value(row);
            let items = (0..values.len())
                .map(|i| array_value_to_json(values.as_ref(), i))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::Array(items))
        }

        DataType::Struct(_) => {
            let arr = downcast::<StructArray>(array)?;
            let mut obj = serde_json::Map::new();
            for (i, field) in arr.fields().iter().enumerate() {
                let val = array_value_to_json(arr.column(i).as_ref(), row)?;
                obj.insert(field.name().clone(), val);
            }
            Ok(Value::Object(obj))
        }

        other => Err(Error::output(format!(
            "Cannot render column type {other} as JSON"
        ))),
    }
}

fn downcast<T: 'static>(array: &dyn Array) -> Result<&T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| Error::output(format!("Failed to downcast {}", array.data_type())))
}
