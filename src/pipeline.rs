use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;

use crate::error::{PipelineError, PipelineResult};
use crate::model::RegressionModel;
use crate::preprocessor::Preprocessor;
use crate::utils::load_object;

pub static ARTIFACTS_DIR: &str = "artifacts";
pub static PREPROCESSOR_FILE_NAME: &str = "preprocessor.json";
pub static MODEL_FILE_NAME: &str = "model.json";

/// Loads the fitted preprocessor and model and runs them on a record table.
///
/// Construction does no I/O. Both artifacts are read from disk again on
/// every call to [`PredictPipeline::predict`].
#[derive(Debug, Clone)]
pub struct PredictPipeline {
    artifacts_dir: PathBuf,
}

impl PredictPipeline {
    pub fn new() -> Self {
        Self::with_artifacts_dir(ARTIFACTS_DIR)
    }

    pub fn with_artifacts_dir<P: AsRef<Path>>(artifacts_dir: P) -> Self {
        Self {
            artifacts_dir: artifacts_dir.as_ref().to_path_buf(),
        }
    }

    pub fn preprocessor_path(&self) -> PathBuf {
        self.artifacts_dir.join(PREPROCESSOR_FILE_NAME)
    }

    pub fn model_path(&self) -> PathBuf {
        self.artifacts_dir.join(MODEL_FILE_NAME)
    }

    /// One prediction per row of `features`.
    pub fn predict(&self, features: &DataFrame) -> PipelineResult<Vec<f64>> {
        let preprocessor: Preprocessor = load_object(self.preprocessor_path())?;
        let model: RegressionModel = load_object(self.model_path())?;

        if preprocessor.n_features() != model.n_features() {
            return Err(PipelineError::ShapeMismatch {
                expected: model.n_features(),
                found: preprocessor.n_features(),
            });
        }

        let x = preprocessor.transform(features)?;
        log::debug!("transformed {} rows into model features", features.height());

        let predictions = model.predict(&x)?;
        log::debug!("predicted {:?}", predictions);
        Ok(predictions)
    }
}

impl Default for PredictPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::CustomData;
    use crate::utils::save_object;
    use polars::prelude::{NamedFrom, Series};
    use smartcore::linalg::basic::matrix::DenseMatrix;

    fn row() -> DataFrame {
        CustomData::new(
            "male",
            "group A",
            "bachelor's degree",
            "standard",
            "completed",
            75.0,
            80.0,
        )
        .get_data_as_data_frame()
        .unwrap()
    }

    #[test]
    fn test_new_points_at_conventional_paths() {
        let pipeline = PredictPipeline::new();
        assert_eq!(pipeline.preprocessor_path(), Path::new("artifacts/preprocessor.json"));
        assert_eq!(pipeline.model_path(), Path::new("artifacts/model.json"));
    }

    #[test]
    fn test_missing_artifacts_fail_at_predict() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PredictPipeline::with_artifacts_dir(dir.path());

        let err = pipeline.predict(&row()).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ArtifactMissing { ref path } if path.ends_with(PREPROCESSOR_FILE_NAME)
        ));
    }

    #[test]
    fn test_width_mismatch_between_artifacts_fails() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PredictPipeline::with_artifacts_dir(dir.path());

        let df = DataFrame::new(vec![
            Series::new("writing_score", &[60.0, 70.0, 80.0, 90.0]),
            Series::new("reading_score", &[55.0, 65.0, 70.0, 95.0]),
        ])
        .unwrap();
        let preprocessor =
            Preprocessor::fit(&df, &["writing_score", "reading_score"], &[]).unwrap();
        let x = DenseMatrix::new(4, 1, vec![1.0, 2.0, 3.0, 4.0], false);
        let model = RegressionModel::fit_linear(&x, &vec![2.0, 4.0, 6.0, 8.0]).unwrap();
        save_object(pipeline.preprocessor_path(), &preprocessor).unwrap();
        save_object(pipeline.model_path(), &model).unwrap();

        let err = pipeline.predict(&df).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ShapeMismatch { expected: 1, found: 2 }
        ));
    }

    #[test]
    fn test_model_with_misdeclared_width_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = PredictPipeline::with_artifacts_dir(dir.path());

        let df = DataFrame::new(vec![
            Series::new("writing_score", &[60.0, 70.0, 80.0, 90.0]),
            Series::new("reading_score", &[55.0, 65.0, 70.0, 95.0]),
        ])
        .unwrap();
        let preprocessor =
            Preprocessor::fit(&df, &["writing_score", "reading_score"], &[]).unwrap();
        let x = DenseMatrix::new(4, 1, vec![1.0, 2.0, 3.0, 4.0], false);
        let model = RegressionModel::fit_linear(&x, &vec![2.0, 4.0, 6.0, 8.0]).unwrap();
        // one coefficient, but claims to take the preprocessor's two columns
        let mut document = serde_json::to_value(&model).unwrap();
        document["n_features"] = serde_json::json!(preprocessor.n_features());
        save_object(pipeline.preprocessor_path(), &preprocessor).unwrap();
        save_object(pipeline.model_path(), &document).unwrap();

        let err = pipeline.predict(&df).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Deserialize { ref path, .. } if path.ends_with(MODEL_FILE_NAME)
        ));
    }
}
