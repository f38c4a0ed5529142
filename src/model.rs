use serde::{Deserialize, Serialize};
use serde_json::Value;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{LinearRegression, LinearRegressionParameters};
use smartcore::linear::ridge_regression::{RidgeRegression, RidgeRegressionParameters};

use crate::error::{PipelineError, PipelineResult};

type Linear = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;
type Ridge = RidgeRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "params", rename_all = "snake_case")]
pub enum Estimator {
    Linear(Linear),
    Ridge(Ridge),
}

/// Serialized layout of a smartcore `DenseMatrix`.
#[derive(Deserialize)]
struct MatrixShape {
    nrows: usize,
    ncols: usize,
    values: Vec<f64>,
}

#[derive(Deserialize)]
struct FittedParams {
    coefficients: Option<MatrixShape>,
    intercept: Option<f64>,
}

impl Estimator {
    /// Number of input features the fitted coefficients accept.
    ///
    /// smartcore panics on a missing fit or a shape mismatch at predict time,
    /// so the fitted state is read back from its serialized form instead.
    fn width(&self) -> Result<usize, String> {
        let params = match serde_json::to_value(self).map_err(|e| e.to_string())? {
            Value::Object(mut fields) => fields.remove("params").unwrap_or_default(),
            _ => return Err("estimator is not an object".to_string()),
        };
        let fitted: FittedParams = serde_json::from_value(params).map_err(|e| e.to_string())?;
        if fitted.intercept.is_none() {
            return Err("estimator has no intercept".to_string());
        }
        let coefficients = fitted
            .coefficients
            .ok_or_else(|| "estimator has no coefficients".to_string())?;
        if coefficients.values.len() != coefficients.nrows * coefficients.ncols {
            return Err(format!(
                "coefficients hold {} values for a {}x{} matrix",
                coefficients.values.len(),
                coefficients.nrows,
                coefficients.ncols
            ));
        }
        match (coefficients.nrows, coefficients.ncols) {
            (n, 1) | (1, n) => Ok(n),
            (rows, cols) => Err(format!("coefficients have shape {}x{}", rows, cols)),
        }
    }
}

/// Fitted regression artifact, tagged with the feature width it was fit on.
///
/// Loading fails unless the stored width matches the fitted coefficients.
#[derive(Debug, Serialize, Deserialize)]
#[serde(try_from = "RawRegressionModel")]
pub struct RegressionModel {
    n_features: usize,
    estimator: Estimator,
}

#[derive(Deserialize)]
struct RawRegressionModel {
    n_features: usize,
    estimator: Estimator,
}

impl TryFrom<RawRegressionModel> for RegressionModel {
    type Error = String;

    fn try_from(raw: RawRegressionModel) -> Result<Self, Self::Error> {
        let width = raw.estimator.width()?;
        if width != raw.n_features {
            return Err(format!(
                "model declares {} features but its coefficients take {}",
                raw.n_features, width
            ));
        }
        Ok(Self {
            n_features: raw.n_features,
            estimator: raw.estimator,
        })
    }
}

impl RegressionModel {
    pub fn fit_linear(x: &DenseMatrix<f64>, y: &Vec<f64>) -> PipelineResult<Self> {
        let estimator = LinearRegression::fit(x, y, LinearRegressionParameters::default())
            .map_err(|e| PipelineError::Model(e.to_string()))?;
        Ok(Self {
            n_features: x.shape().1,
            estimator: Estimator::Linear(estimator),
        })
    }

    pub fn fit_ridge(x: &DenseMatrix<f64>, y: &Vec<f64>, alpha: f64) -> PipelineResult<Self> {
        let parameters = RidgeRegressionParameters::default().with_alpha(alpha);
        let estimator =
            RidgeRegression::fit(x, y, parameters).map_err(|e| PipelineError::Model(e.to_string()))?;
        Ok(Self {
            n_features: x.shape().1,
            estimator: Estimator::Ridge(estimator),
        })
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn predict(&self, x: &DenseMatrix<f64>) -> PipelineResult<Vec<f64>> {
        let predictions = match &self.estimator {
            Estimator::Linear(model) => model.predict(x),
            Estimator::Ridge(model) => model.predict(x),
        };
        predictions.map_err(|e| PipelineError::Model(e.to_string()))
    }
}
