// Query engine adapter
//
// Wraps a DataFusion SessionContext: registers catalog datasets as
// in-memory tables and executes SQL strings, materializing the whole
// result eagerly for display and chart classification.

use datafusion::arrow::array::{
    Array, ArrayRef, BooleanArray, Decimal128Array, Float32Array, Float64Array, Int32Array,
    Int64Array, LargeStringArray, RecordBatch, StringArray, UInt64Array,
};
use datafusion::arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use datafusion::arrow::util::display::array_value_to_string;
use datafusion::datasource::MemTable;
use datafusion::prelude::*;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;

use crate::api::middleware::AppError;
use crate::models::{numeric_cell, text_cell, ColumnSchema, ColumnType, Dataset, QueryResult};

/// Executes SQL against the session's registered datasets.
pub struct QueryEngine {
    ctx: SessionContext,
}

impl QueryEngine {
    pub fn new() -> Self {
        let config = SessionConfig::new()
            .with_target_partitions(num_cpus::get())
            .with_information_schema(true);

        Self {
            ctx: SessionContext::new_with_config(config),
        }
    }

    /// Make a catalog dataset queryable under its table identifier.
    ///
    /// Numeric columns become nullable Float64, text columns nullable
    /// Utf8; unparseable numeric cells land as NULL.
    pub fn register_table(&self, dataset: &Dataset) -> Result<(), AppError> {
        let schema = Arc::new(dataset_schema(dataset));
        let batch = dataset_batch(schema.clone(), dataset)
            .map_err(|e| AppError::Internal(format!("failed to build table data: {}", e)))?;

        let table = MemTable::try_new(schema, vec![vec![batch]])
            .map_err(|e| AppError::Internal(format!("failed to build table: {}", e)))?;

        self.ctx
            .register_table(dataset.table_id.as_str(), Arc::new(table))
            .map_err(|e| AppError::Internal(format!("failed to register table: {}", e)))?;

        tracing::info!(table_id = %dataset.table_id, "registered dataset");
        Ok(())
    }

    /// Execute a SQL string and materialize the full result.
    ///
    /// Parse errors, unknown tables, and runtime errors all surface as a
    /// single `QueryFailed` with the engine's message passed through.
    pub async fn execute(&self, sql: &str) -> Result<QueryResult, AppError> {
        tracing::debug!(%sql, "executing query");

        let (schema, batches) = self
            .run(sql)
            .await
            .map_err(|e| AppError::QueryFailed(e.to_string()))?;

        let columns: Vec<ColumnSchema> = schema
            .fields()
            .iter()
            .map(|field| ColumnSchema::new(field.name().clone(), column_type_of(field.data_type())))
            .collect();

        let mut rows = Vec::new();
        for batch in &batches {
            for row_idx in 0..batch.num_rows() {
                let mut row = Vec::with_capacity(batch.num_columns());
                for col_idx in 0..batch.num_columns() {
                    let value = cell_to_json(batch.column(col_idx), row_idx)
                        .map_err(|e| AppError::QueryFailed(e.to_string()))?;
                    row.push(value);
                }
                rows.push(row);
            }
        }

        let row_count = rows.len();
        Ok(QueryResult {
            columns,
            rows,
            row_count,
            query_text: sql.to_string(),
        })
    }

    async fn run(&self, sql: &str) -> datafusion::error::Result<(SchemaRef, Vec<RecordBatch>)> {
        let df = self.ctx.sql(sql).await?;
        // Take the schema from the plan, not the first batch, so empty
        // results keep their columns.
        let schema: SchemaRef = Arc::new(df.schema().as_arrow().clone());
        let batches = df.collect().await?;
        Ok((schema, batches))
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize an Arrow output type down to the two-way signature used
/// throughout the session engine.
pub fn column_type_of(data_type: &DataType) -> ColumnType {
    use DataType::*;
    match data_type {
        Int8 | Int16 | Int32 | Int64 | UInt8 | UInt16 | UInt32 | UInt64 | Float16 | Float32
        | Float64 | Decimal128(_, _) | Decimal256(_, _) => ColumnType::Numeric,
        _ => ColumnType::Text,
    }
}

fn dataset_schema(dataset: &Dataset) -> Schema {
    let fields: Vec<Field> = dataset
        .columns
        .iter()
        .map(|col| {
            let data_type = match col.column_type {
                ColumnType::Numeric => DataType::Float64,
                ColumnType::Text => DataType::Utf8,
            };
            Field::new(&col.name, data_type, true)
        })
        .collect();

    Schema::new(fields)
}

fn dataset_batch(schema: SchemaRef, dataset: &Dataset) -> anyhow::Result<RecordBatch> {
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(dataset.columns.len());

    for (idx, col) in dataset.columns.iter().enumerate() {
        let array: ArrayRef = match col.column_type {
            ColumnType::Numeric => Arc::new(Float64Array::from(
                dataset
                    .rows
                    .iter()
                    .map(|row| row.get(idx).and_then(numeric_cell))
                    .collect::<Vec<Option<f64>>>(),
            )),
            ColumnType::Text => Arc::new(StringArray::from(
                dataset
                    .rows
                    .iter()
                    .map(|row| row.get(idx).and_then(text_cell))
                    .collect::<Vec<Option<String>>>(),
            )),
        };
        arrays.push(array);
    }

    Ok(RecordBatch::try_new(schema, arrays)?)
}

/// Convert one Arrow cell to JSON for display and classification.
fn cell_to_json(array: &ArrayRef, row_idx: usize) -> anyhow::Result<JsonValue> {
    if array.is_null(row_idx) {
        return Ok(JsonValue::Null);
    }

    let value = match array.data_type() {
        DataType::Boolean => {
            let array = array
                .as_any()
                .downcast_ref::<BooleanArray>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to BooleanArray"))?;
            json!(array.value(row_idx))
        }
        DataType::Int32 => {
            let array = array
                .as_any()
                .downcast_ref::<Int32Array>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to Int32Array"))?;
            json!(array.value(row_idx))
        }
        DataType::Int64 => {
            let array = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to Int64Array"))?;
            json!(array.value(row_idx))
        }
        DataType::UInt64 => {
            let array = array
                .as_any()
                .downcast_ref::<UInt64Array>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to UInt64Array"))?;
            json!(array.value(row_idx))
        }
        DataType::Float32 => {
            let array = array
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to Float32Array"))?;
            json!(array.value(row_idx))
        }
        DataType::Float64 => {
            let array = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to Float64Array"))?;
            json!(array.value(row_idx))
        }
        DataType::Decimal128(_, scale) => {
            let decimals = array
                .as_any()
                .downcast_ref::<Decimal128Array>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to Decimal128Array"))?;
            let divisor = 10_i128.pow(*scale as u32);
            json!(decimals.value(row_idx) as f64 / divisor as f64)
        }
        DataType::Utf8 => {
            let array = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to StringArray"))?;
            json!(array.value(row_idx))
        }
        DataType::LargeUtf8 => {
            let array = array
                .as_any()
                .downcast_ref::<LargeStringArray>()
                .ok_or_else(|| anyhow::anyhow!("failed to downcast to LargeStringArray"))?;
            json!(array.value(row_idx))
        }
        // Dates, timestamps, intervals and other less common output
        // types render through Arrow's display formatting.
        _ => json!(array_value_to_string(array, row_idx)?),
    };

    Ok(value)
}
