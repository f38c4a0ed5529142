use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use polars::prelude::*;
use polars_io::parquet::{ParquetReader, ParquetWriter};

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::PredictPipeline;
use crate::records::CustomData;

pub static PREDICTION_COLUMN: &str = "predicted_math_score";

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum TableFormat {
    Csv,
    Parquet,
}

impl TableFormat {
    pub fn from_path(path: &Path) -> PipelineResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "parquet" | "pq" => Ok(TableFormat::Parquet),
            _ => Err(PipelineError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Read a table of records. Columns named like [`CustomData`]'s fields get
/// its dtypes, so integer scores in a CSV still load as floats.
pub fn read_table<P: AsRef<Path>>(path: P) -> PipelineResult<DataFrame> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;

    let df = match format {
        TableFormat::Csv => CsvReader::new(file)
            .has_header(true)
            .with_dtypes(Some(Arc::new(CustomData::schema())))
            .finish()?,
        TableFormat::Parquet => ParquetReader::new(file).finish()?,
    };
    Ok(df)
}

pub fn write_table<P: AsRef<Path>>(path: P, df: &mut DataFrame) -> PipelineResult<()> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path)?;
    let mut file = File::create(path).map_err(|e| PipelineError::io(path, e))?;

    match format {
        TableFormat::Csv => CsvWriter::new(&mut file).finish(df)?,
        TableFormat::Parquet => {
            ParquetWriter::new(&mut file).finish(df)?;
        }
    }
    Ok(())
}

/// Score every row of `input` and write it to `output` with an extra
/// prediction column. Returns the number of rows scored.
pub fn predict_file<P: AsRef<Path>, Q: AsRef<Path>>(
    pipeline: &PredictPipeline,
    input: P,
    output: Q,
) -> PipelineResult<usize> {
    let mut df = read_table(&input)?;
    log::info!(
        "scoring {} rows from {}",
        df.height(),
        input.as_ref().display()
    );

    let predictions = pipeline.predict(&df)?;
    df.with_column(Series::new(PREDICTION_COLUMN, predictions))?;

    write_table(&output, &mut df)?;
    log::info!("wrote predictions to {}", output.as_ref().display());
    Ok(df.height())
}
