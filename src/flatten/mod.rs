//! Flatten module
//!
//! Turns the nested order/customer/product documents into one denormalized
//! row per product.
//!
//! # Overview
//!
//! - `parse_orders` decodes the raw object bytes into a list of JSON orders
//! - `flatten_orders` walks orders × products and emits a `FlatRow` each
//!
//! Field values are copied as-is. Types are only decided later, when the rows
//! are encoded into Arrow columns.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Output columns, in the order they appear in the encoded table
pub const ORDER_COLUMNS: [&str; 12] = [
    "order_id",
    "order_date",
    "total_amount",
    "customer_id",
    "customer_name",
    "email",
    "address",
    "product_id",
    "product_name",
    "category",
    "price",
    "quantity",
];

/// One order × product combination with its customer attached
#[derive(Debug, Clone, PartialEq)]
pub struct FlatRow {
    pub order_id: Value,
    pub order_date: Value,
    pub total_amount: Value,
    pub customer_id: Value,
    pub customer_name: Value,
    pub email: Value,
    pub address: Value,
    pub product_id: Value,
    pub product_name: Value,
    pub category: Value,
    pub price: Value,
    pub quantity: Value,
}

impl FlatRow {
    /// Get a value by output column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        let value = match column {
            "order_id" => &self.order_id,
            "order_date" => &self.order_date,
            "total_amount" => &self.total_amount,
            "customer_id" => &self.customer_id,
            "customer_name" => &self.customer_name,
            "email" => &self.email,
            "address" => &self.address,
            "product_id" => &self.product_id,
            "product_name" => &self.product_name,
            "category" => &self.category,
            "price" => &self.price,
            "quantity" => &self.quantity,
            _ => return None,
        };
        Some(value)
    }

    /// Values in `ORDER_COLUMNS` order
    pub fn values(&self) -> [&Value; 12] {
        [
            &self.order_id,
            &self.order_date,
            &self.total_amount,
            &self.customer_id,
            &self.customer_name,
            &self.email,
            &self.address,
            &self.product_id,
            &self.product_name,
            &self.category,
            &self.price,
            &self.quantity,
        ]
    }

    /// Render the row as a JSON object keyed by column name
    pub fn to_json(&self) -> Value {
        let object: Map<String, Value> = ORDER_COLUMNS
            .iter()
            .zip(self.values())
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect();
        Value::Object(object)
    }
}

/// Decode object bytes into the list of orders
///
/// Bytes must be UTF-8 and hold a JSON array at the top level.
pub fn parse_orders(bytes: &[u8]) -> Result<Vec<Value>> {
    let text = std::str::from_utf8(bytes).map_err(|e| Error::Decode {
        message: e.to_string(),
    })?;

    match serde_json::from_str(text)? {
        Value::Array(orders) => Ok(orders),
        other => Err(Error::invalid_shape(
            "orders",
            format!("a JSON array of orders, found {}", kind(&other)),
        )),
    }
}

/// Flatten orders into one row per product
///
/// Rows keep input order: orders as listed, then products as listed within
/// each order. Fields are only read for orders that have products, so an
/// order with an empty product list contributes nothing and is not checked.
pub fn flatten_orders(orders: &[Value]) -> Result<Vec<FlatRow>> {
    let mut rows = Vec::new();

    for (i, order) in orders.iter().enumerate() {
        let order_path = format!("orders[{i}]");
        let products = field(order, "products", &order_path)?;
        let products = products.as_array().ok_or_else(|| {
            Error::invalid_shape(format!("{order_path}.products"), "an array of products")
        })?;

        for (j, product) in products.iter().enumerate() {
            let product_path = format!("{order_path}.products[{j}]");
            let customer_path = format!("{order_path}.customer");

            // Same access order as the column layout
            let order_id = field(order, "order_id", &order_path)?.clone();
            let order_date = field(order, "order_date", &order_path)?.clone();
            let total_amount = field(order, "total_amount", &order_path)?.clone();
            let customer = field(order, "customer", &order_path)?;

            rows.push(FlatRow {
                order_id,
                order_date,
                total_amount,
                customer_id: field(customer, "customer_id", &customer_path)?.clone(),
                customer_name: field(customer, "name", &customer_path)?.clone(),
                email: field(customer, "email", &customer_path)?.clone(),
                address: field(customer, "address", &customer_path)?.clone(),
                product_id: field(product, "product_id", &product_path)?.clone(),
                product_name: field(product, "name", &product_path)?.clone(),
                category: field(product, "category", &product_path)?.clone(),
                price: field(product, "price", &product_path)?.clone(),
                quantity: field(product, "quantity", &product_path)?.clone(),
            });
        }
    }

    Ok(rows)
}

/// Look up a key on a JSON object, reporting the full path when absent
fn field<'a>(value: &'a Value, key: &str, path: &str) -> Result<&'a Value> {
    let object = value
        .as_object()
        .ok_or_else(|| Error::invalid_shape(path, format!("an object, found {}", kind(value))))?;
    object
        .get(key)
        .ok_or_else(|| Error::missing_field(format!("{path}.{key}")))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
