//! CSV ingestion.
//!
//! Loads a delimited file into a typed [`Dataset`]. The schema is taken
//! from the parsed dtypes unless an explicit schema is supplied; either
//! way it is validated once here and fixed for the rest of the run.

use crate::dataset::{Dataset, TableSchema};
use crate::error::{Result, ResultExt};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Load a CSV file into a dataset with an inferred schema.
pub fn load_csv(path: &Path) -> Result<Dataset> {
    let df = read_frame(path)?;
    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded dataset"
    );
    Dataset::from_frame(df)
}

/// Load a CSV file and validate it against an explicit schema.
pub fn load_csv_with_schema(path: &Path, schema: TableSchema) -> Result<Dataset> {
    let df = read_frame(path)?;
    Dataset::new(df, schema).context(format!("While validating '{}'", path.display()))
}

fn read_frame(path: &Path) -> Result<DataFrame> {
    // Standard loading with quote handling first, then a permissive retry.
    let attempt = CsvReadOptions::default()
        .with_infer_schema_length(Some(100))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish();

    match attempt {
        Ok(df) => Ok(df),
        Err(e) => {
            debug!("standard CSV parse failed, retrying without quotes: {e}");
            let df = CsvReadOptions::default()
                .with_infer_schema_length(Some(100))
                .with_has_header(true)
                .try_into_reader_with_file_path(Some(path.to_path_buf()))?
                .finish()?;
            Ok(df)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ColumnKind, ColumnSpec};
    use std::io::Write;

    fn write_temp_csv(name: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_infers_kinds() {
        let path = write_temp_csv(
            "rideaudit_ingest_basic.csv",
            "fare,distance,city\n10.5,2.0,ams\n12.0,3.5,rtm\n9.0,1.2,utc\n",
        );
        let ds = load_csv(&path).unwrap();
        assert_eq!(ds.height(), 3);
        assert_eq!(ds.schema().kind_of("fare"), Some(ColumnKind::Float));
        assert_eq!(ds.schema().kind_of("city"), Some(ColumnKind::Categorical));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_csv_with_matching_schema() {
        let path = write_temp_csv(
            "rideaudit_ingest_schema.csv",
            "fare,city\n10.5,ams\n12.0,rtm\n",
        );
        let schema = TableSchema::new(vec![
            ColumnSpec {
                name: "fare".to_string(),
                kind: ColumnKind::Float,
            },
            ColumnSpec {
                name: "city".to_string(),
                kind: ColumnKind::Categorical,
            },
        ]);
        let ds = load_csv_with_schema(&path, schema).unwrap();
        assert_eq!(ds.numeric_columns(), vec!["fare"]);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_csv_with_wrong_schema_fails() {
        let path = write_temp_csv(
            "rideaudit_ingest_bad_schema.csv",
            "fare,city\n10.5,ams\n12.0,rtm\n",
        );
        let schema = TableSchema::new(vec![
            ColumnSpec {
                name: "fare".to_string(),
                kind: ColumnKind::Categorical,
            },
            ColumnSpec {
                name: "city".to_string(),
                kind: ColumnKind::Categorical,
            },
        ]);
        assert!(load_csv_with_schema(&path, schema).is_err());
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = load_csv(Path::new("/nonexistent/rideaudit.csv"));
        assert!(result.is_err());
    }
}
