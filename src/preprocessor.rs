//! Fitted feature transformer turning a record table into model input.
//!
//! Numerical columns are median-imputed and standardised. Categorical columns
//! are imputed with their most frequent label, one-hot encoded over the sorted
//! labels seen at fit time, and each indicator is divided by its standard
//! deviation without centering. The output keeps the numerical block first.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, DataType, Series};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{PipelineError, PipelineResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawNumericScaler")]
pub struct NumericScaler {
    pub column: String,
    pub median: f64,
    pub mean: f64,
    pub scale: f64,
}

impl NumericScaler {
    fn fit(column: &str, values: &[Option<f64>]) -> PipelineResult<Self> {
        let mut present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Err(PipelineError::EmptyColumn {
                column: column.to_string(),
            });
        }
        present.sort_by(|a, b| a.total_cmp(b));
        let mid = present.len() / 2;
        let median = if present.len() % 2 == 0 {
            (present[mid - 1] + present[mid]) / 2.0
        } else {
            present[mid]
        };

        let imputed: Vec<f64> = values.iter().map(|v| v.unwrap_or(median)).collect();
        let n = imputed.len() as f64;
        let mean = imputed.iter().sum::<f64>() / n;
        let variance = imputed.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        Ok(Self {
            column: column.to_string(),
            median,
            mean,
            scale: non_zero_scale(variance.sqrt()),
        })
    }

    fn apply(&self, value: Option<f64>) -> f64 {
        (value.unwrap_or(self.median) - self.mean) / self.scale
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawOneHotEncoder")]
pub struct OneHotEncoder {
    pub column: String,
    pub most_frequent: String,
    pub categories: Vec<String>,
    /// Standard deviation of each indicator column, aligned with `categories`.
    pub scales: Vec<f64>,
}

impl OneHotEncoder {
    fn fit(column: &str, values: &[Option<String>]) -> PipelineResult<Self> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for value in values.iter().flatten() {
            *counts.entry(value.as_str()).or_insert(0) += 1;
        }

        // BTreeMap iterates in label order, so ties resolve to the smallest label.
        let most_frequent = counts
            .iter()
            .fold(None, |best: Option<(&str, usize)>, (&label, &count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((label, count)),
            })
            .map(|(label, _)| label.to_string())
            .ok_or_else(|| PipelineError::EmptyColumn {
                column: column.to_string(),
            })?;

        let missing = values.iter().filter(|v| v.is_none()).count();
        if let Some(count) = counts.get_mut(most_frequent.as_str()) {
            *count += missing;
        }

        let n = values.len() as f64;
        let categories: Vec<String> = counts.keys().map(|label| label.to_string()).collect();
        let scales = counts
            .values()
            .map(|&count| {
                let p = count as f64 / n;
                non_zero_scale((p * (1.0 - p)).sqrt())
            })
            .collect();

        Ok(Self {
            column: column.to_string(),
            most_frequent,
            categories,
            scales,
        })
    }

    fn index_of(&self, value: Option<&str>) -> PipelineResult<usize> {
        let label = value.unwrap_or(self.most_frequent.as_str());
        self.categories
            .binary_search_by(|category| category.as_str().cmp(label))
            .map_err(|_| PipelineError::UnknownCategory {
                column: self.column.clone(),
                value: label.to_string(),
            })
    }
}

/// Unchecked on-disk form of [`NumericScaler`].
#[derive(Deserialize)]
struct RawNumericScaler {
    column: String,
    median: f64,
    mean: f64,
    scale: f64,
}

impl TryFrom<RawNumericScaler> for NumericScaler {
    type Error = String;

    fn try_from(raw: RawNumericScaler) -> Result<Self, Self::Error> {
        if !raw.median.is_finite() || !raw.mean.is_finite() {
            return Err(format!("scaler for {:?} has a non-finite centre", raw.column));
        }
        if !raw.scale.is_finite() || raw.scale == 0.0 {
            return Err(format!("scaler for {:?} has scale {}", raw.column, raw.scale));
        }
        Ok(Self {
            column: raw.column,
            median: raw.median,
            mean: raw.mean,
            scale: raw.scale,
        })
    }
}

/// Unchecked on-disk form of [`OneHotEncoder`].
#[derive(Deserialize)]
struct RawOneHotEncoder {
    column: String,
    most_frequent: String,
    categories: Vec<String>,
    scales: Vec<f64>,
}

impl TryFrom<RawOneHotEncoder> for OneHotEncoder {
    type Error = String;

    fn try_from(raw: RawOneHotEncoder) -> Result<Self, Self::Error> {
        if raw.categories.is_empty() {
            return Err(format!("encoder for {:?} has no categories", raw.column));
        }
        if raw.scales.len() != raw.categories.len() {
            return Err(format!(
                "encoder for {:?} has {} scales for {} categories",
                raw.column,
                raw.scales.len(),
                raw.categories.len()
            ));
        }
        // index_of relies on binary search
        if raw.categories.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(format!(
                "encoder for {:?} has categories that are not sorted and unique",
                raw.column
            ));
        }
        if raw.scales.iter().any(|scale| !scale.is_finite() || *scale == 0.0) {
            return Err(format!("encoder for {:?} has a zero or non-finite scale", raw.column));
        }
        if raw.categories.binary_search(&raw.most_frequent).is_err() {
            return Err(format!(
                "encoder for {:?} imputes {:?}, which is not a category",
                raw.column, raw.most_frequent
            ));
        }
        Ok(Self {
            column: raw.column,
            most_frequent: raw.most_frequent,
            categories: raw.categories,
            scales: raw.scales,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preprocessor {
    numerical: Vec<NumericScaler>,
    categorical: Vec<OneHotEncoder>,
}

impl Preprocessor {
    /// Learn imputation values, label vocabularies and scales from `df`.
    pub fn fit(df: &DataFrame, numerical: &[&str], categorical: &[&str]) -> PipelineResult<Self> {
        let numerical = numerical
            .iter()
            .map(|&column| NumericScaler::fit(column, &numeric_values(df, column)?))
            .collect::<PipelineResult<Vec<_>>>()?;
        let categorical = categorical
            .iter()
            .map(|&column| OneHotEncoder::fit(column, &categorical_values(df, column)?))
            .collect::<PipelineResult<Vec<_>>>()?;

        let preprocessor = Self {
            numerical,
            categorical,
        };
        log::debug!(
            "fitted preprocessor on {} rows, {} output features",
            df.height(),
            preprocessor.n_features()
        );
        Ok(preprocessor)
    }

    /// Width of the matrix produced by [`Preprocessor::transform`].
    pub fn n_features(&self) -> usize {
        self.numerical.len()
            + self
                .categorical
                .iter()
                .map(|encoder| encoder.categories.len())
                .sum::<usize>()
    }

    pub fn feature_names(&self) -> Vec<String> {
        let numerical = self.numerical.iter().map(|scaler| scaler.column.clone());
        let categorical = self.categorical.iter().flat_map(|encoder| {
            encoder
                .categories
                .iter()
                .map(move |category| format!("{}_{}", encoder.column, category))
        });
        numerical.chain(categorical).collect()
    }

    /// Row-major feature matrix with one row per row of `df`.
    pub fn transform(&self, df: &DataFrame) -> PipelineResult<DenseMatrix<f64>> {
        let nrows = df.height();
        if nrows == 0 {
            return Err(PipelineError::EmptyInput);
        }
        let ncols = self.n_features();
        let mut xs = vec![0.0; nrows * ncols];
        let mut offset = 0;

        for scaler in &self.numerical {
            for (row, value) in numeric_values(df, &scaler.column)?.into_iter().enumerate() {
                xs[row * ncols + offset] = scaler.apply(value);
            }
            offset += 1;
        }

        for encoder in &self.categorical {
            for (row, value) in categorical_values(df, &encoder.column)?
                .iter()
                .enumerate()
            {
                let idx = encoder.index_of(value.as_deref())?;
                xs[row * ncols + offset + idx] = 1.0 / encoder.scales[idx];
            }
            offset += encoder.categories.len();
        }

        Ok(DenseMatrix::new(nrows, ncols, xs, false))
    }
}

fn non_zero_scale(std: f64) -> f64 {
    if std == 0.0 {
        1.0
    } else {
        std
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> PipelineResult<&'a Series> {
    df.column(name).map_err(|_| PipelineError::MissingColumn {
        column: name.to_string(),
    })
}

fn numeric_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<f64>>> {
    let series = column(df, name)?;
    if !series.dtype().is_numeric() {
        return Err(PipelineError::ColumnType {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }
    let casted = series.cast(&DataType::Float64)?;
    let values = casted.f64()?.into_iter().collect();
    Ok(values)
}

fn categorical_values(df: &DataFrame, name: &str) -> PipelineResult<Vec<Option<String>>> {
    let series = column(df, name)?;
    if series.dtype() != &DataType::Utf8 {
        return Err(PipelineError::ColumnType {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }
    let values = series
        .utf8()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}
