//! The in-memory dataset model.
//!
//! A [`Dataset`] is a polars `DataFrame` paired with a schema that was
//! validated once at construction. The column set and kinds are fixed for
//! the dataset's lifetime; cleaning produces a *new* `Dataset` with fewer
//! rows, never a mutation of the original. All downstream components work
//! through this typed view instead of raw frame lookups.

use crate::error::{AuditError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Semantic kind of a column, fixed at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    /// Free text or enumerated labels.
    Categorical,
    /// Floating-point measurements.
    Float,
    /// Integer counts or codes treated as numeric.
    Integer,
    /// Dates and timestamps.
    DateTime,
}

impl ColumnKind {
    /// Whether the column participates in numeric analysis.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Float | Self::Integer)
    }

    /// Derive the kind from a physical polars dtype.
    pub fn from_dtype(dtype: &DataType) -> Self {
        match dtype {
            DataType::Float32 | DataType::Float64 => Self::Float,
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => Self::Integer,
            DataType::Date | DataType::Datetime(_, _) | DataType::Time => Self::DateTime,
            _ => Self::Categorical,
        }
    }

    fn matches_dtype(&self, dtype: &DataType) -> bool {
        Self::from_dtype(dtype) == *self
    }
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Categorical => "categorical",
            Self::Float => "float",
            Self::Integer => "integer",
            Self::DateTime => "datetime",
        };
        f.write_str(name)
    }
}

/// A single column declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Ordered column declarations for a dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSchema {
    columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Build a schema from explicit column declarations.
    pub fn new(columns: Vec<ColumnSpec>) -> Self {
        Self { columns }
    }

    /// Infer a schema from a frame's physical dtypes.
    pub fn infer(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnSpec {
                name: col.name().to_string(),
                kind: ColumnKind::from_dtype(col.dtype()),
            })
            .collect();
        Self { columns }
    }

    /// All declared columns in order.
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Kind of a named column, if declared.
    pub fn kind_of(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.kind)
    }

    /// Names of numeric columns, in declaration order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.kind.is_numeric())
            .map(|c| c.name.clone())
            .collect()
    }
}

/// A typed, immutable tabular dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    df: DataFrame,
    schema: TableSchema,
}

impl Dataset {
    /// Wrap a frame under an explicit schema, validating it once.
    ///
    /// Every declared column must exist in the frame with a compatible
    /// physical type. Extra frame columns are rejected so the schema stays
    /// the single source of truth.
    pub fn new(df: DataFrame, schema: TableSchema) -> Result<Self> {
        for spec in schema.columns() {
            let col = df
                .column(&spec.name)
                .map_err(|_| AuditError::ColumnNotFound(spec.name.clone()))?;
            if !spec.kind.matches_dtype(col.dtype()) {
                return Err(AuditError::SchemaMismatch {
                    column: spec.name.clone(),
                    expected: spec.kind.to_string(),
                    found: format!("{:?}", col.dtype()),
                });
            }
        }
        if df.width() != schema.columns().len() {
            return Err(AuditError::InvalidConfig(format!(
                "schema declares {} columns but frame has {}",
                schema.columns().len(),
                df.width()
            )));
        }
        Ok(Self { df, schema })
    }

    /// Wrap a frame, deriving the schema from its physical dtypes.
    pub fn from_frame(df: DataFrame) -> Result<Self> {
        let schema = TableSchema::infer(&df);
        Self::new(df, schema)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.df.width()
    }

    /// The validated schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// The underlying frame, read-only.
    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    /// Names of numeric columns, in declaration order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.schema.numeric_columns()
    }

    /// A numeric column as one `Option<f64>` per row, missing values as `None`.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<Option<f64>>> {
        match self.schema.kind_of(name) {
            Some(kind) if kind.is_numeric() => {}
            Some(kind) => {
                return Err(AuditError::SchemaMismatch {
                    column: name.to_string(),
                    expected: "numeric".to_string(),
                    found: kind.to_string(),
                });
            }
            None => return Err(AuditError::ColumnNotFound(name.to_string())),
        }

        let col = self.df.column(name)?;
        let casted = col.as_materialized_series().cast(&DataType::Float64)?;
        Ok(casted.f64()?.into_iter().collect())
    }

    /// The non-missing values of a numeric column, in row order.
    pub fn non_null_numeric(&self, name: &str) -> Result<Vec<f64>> {
        Ok(self.numeric_values(name)?.into_iter().flatten().collect())
    }

    /// Keep exactly the rows where `keep` is true, producing a new dataset
    /// under the same schema.
    ///
    /// The mask length must match the current height; a stale mask built
    /// against a differently-sized dataset is rejected instead of silently
    /// misaligning rows.
    pub fn retain_rows(&self, keep: &[bool]) -> Result<Dataset> {
        if keep.len() != self.df.height() {
            return Err(AuditError::MaskLengthMismatch {
                mask_len: keep.len(),
                rows: self.df.height(),
            });
        }
        let mask = BooleanChunked::from_slice("keep".into(), keep);
        let filtered = self.df.filter(&mask)?;
        Ok(Dataset {
            df: filtered,
            schema: self.schema.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> DataFrame {
        df![
            "fare" => [10.0f64, 20.0, 30.0],
            "trips" => [1i64, 2, 3],
            "city" => ["a", "b", "c"],
        ]
        .unwrap()
    }

    #[test]
    fn test_infer_schema_kinds() {
        let ds = Dataset::from_frame(sample_frame()).unwrap();
        assert_eq!(ds.schema().kind_of("fare"), Some(ColumnKind::Float));
        assert_eq!(ds.schema().kind_of("trips"), Some(ColumnKind::Integer));
        assert_eq!(ds.schema().kind_of("city"), Some(ColumnKind::Categorical));
        assert_eq!(ds.numeric_columns(), vec!["fare", "trips"]);
    }

    #[test]
    fn test_explicit_schema_mismatch_rejected() {
        let schema = TableSchema::new(vec![
            ColumnSpec {
                name: "fare".to_string(),
                kind: ColumnKind::Categorical,
            },
            ColumnSpec {
                name: "trips".to_string(),
                kind: ColumnKind::Integer,
            },
            ColumnSpec {
                name: "city".to_string(),
                kind: ColumnKind::Categorical,
            },
        ]);
        let result = Dataset::new(sample_frame(), schema);
        assert!(matches!(result, Err(AuditError::SchemaMismatch { .. })));
    }

    #[test]
    fn test_missing_declared_column_rejected() {
        let schema = TableSchema::new(vec![ColumnSpec {
            name: "nonexistent".to_string(),
            kind: ColumnKind::Float,
        }]);
        let result = Dataset::new(sample_frame(), schema);
        assert!(matches!(result, Err(AuditError::ColumnNotFound(_))));
    }

    #[test]
    fn test_numeric_values_preserve_nulls() {
        let df = df!["v" => [Some(1.0f64), None, Some(3.0)]].unwrap();
        let ds = Dataset::from_frame(df).unwrap();
        let values = ds.numeric_values("v").unwrap();
        assert_eq!(values, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(ds.non_null_numeric("v").unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_numeric_values_rejects_categorical() {
        let ds = Dataset::from_frame(sample_frame()).unwrap();
        assert!(ds.numeric_values("city").is_err());
    }

    #[test]
    fn test_retain_rows_produces_new_dataset() {
        let ds = Dataset::from_frame(sample_frame()).unwrap();
        let kept = ds.retain_rows(&[true, false, true]).unwrap();
        assert_eq!(kept.height(), 2);
        // Original untouched
        assert_eq!(ds.height(), 3);
        // Schema carried over
        assert_eq!(kept.numeric_columns(), ds.numeric_columns());
    }

    #[test]
    fn test_retain_rows_rejects_stale_mask() {
        let ds = Dataset::from_frame(sample_frame()).unwrap();
        let result = ds.retain_rows(&[true, false]);
        assert!(matches!(
            result,
            Err(AuditError::MaskLengthMismatch { mask_len: 2, rows: 3 })
        ));
    }
}
