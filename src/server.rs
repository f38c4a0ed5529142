//! HTTP front end: landing page, prediction form and form submission.

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinError;

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::PredictPipeline;
use crate::records::{
    CustomData, GENDERS, LUNCHES, PARENTAL_LEVELS_OF_EDUCATION, RACE_ETHNICITIES,
    TEST_PREPARATION_COURSES,
};

static INDEX_TEMPLATE: &str = include_str!("../templates/index.html");
static HOME_TEMPLATE: &str = include_str!("../templates/home.html");

#[derive(Clone, Debug)]
pub struct AppState {
    artifacts_dir: Arc<PathBuf>,
}

impl AppState {
    pub fn new(artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            artifacts_dir: Arc::new(artifacts_dir.into()),
        }
    }
}

/// Fields posted by the form in `home.html`.
#[derive(Debug, Deserialize)]
pub struct PredictForm {
    pub gender: String,
    pub ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub writing_score: f64,
    pub reading_score: f64,
}

impl From<PredictForm> for CustomData {
    fn from(form: PredictForm) -> Self {
        CustomData::new(
            form.gender,
            form.ethnicity,
            form.parental_level_of_education,
            form.lunch,
            form.test_preparation_course,
            form.reading_score,
            form.writing_score,
        )
    }
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("prediction task did not complete")]
    Join(#[from] JoinError),
    #[error("pipeline returned no prediction")]
    NoPrediction,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        log::error!("prediction failed: {:?}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predictdata", get(form_page).post(predict_datapoint))
        .with_state(state)
}

pub async fn serve(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind((host, port)).await?;
    log::info!(
        "listening on http://{} with artifacts in {}",
        listener.local_addr()?,
        state.artifacts_dir.display()
    );
    axum::serve(listener, router(state)).await
}

async fn index() -> Html<&'static str> {
    Html(INDEX_TEMPLATE)
}

async fn form_page() -> Html<String> {
    Html(render_home(None))
}

async fn predict_datapoint(
    State(state): State<AppState>,
    Form(form): Form<PredictForm>,
) -> Result<Html<String>, ServerError> {
    let data = CustomData::from(form);
    let artifacts_dir = Arc::clone(&state.artifacts_dir);

    // Artifact reads and the model run block, keep them off the async workers.
    let results = tokio::task::spawn_blocking(move || -> PipelineResult<Vec<f64>> {
        let pred_df = data.get_data_as_data_frame()?;
        log::debug!("before prediction");

        let pipeline = PredictPipeline::with_artifacts_dir(artifacts_dir.as_path());
        log::debug!("mid prediction");

        let results = pipeline.predict(&pred_df)?;
        log::debug!("after prediction");
        Ok(results)
    })
    .await??;

    let result = results.first().copied().ok_or(ServerError::NoPrediction)?;
    log::info!("predicted math score {}", result);
    Ok(Html(render_home(Some(result))))
}

fn render_home(result: Option<f64>) -> String {
    let results = result
        .map(|value| format!("    <h2>The prediction is {}</h2>", value))
        .unwrap_or_default();

    HOME_TEMPLATE
        .replace("{{ gender_options }}", &options(&GENDERS))
        .replace("{{ ethnicity_options }}", &options(&RACE_ETHNICITIES))
        .replace(
            "{{ parental_level_of_education_options }}",
            &options(&PARENTAL_LEVELS_OF_EDUCATION),
        )
        .replace("{{ lunch_options }}", &options(&LUNCHES))
        .replace(
            "{{ test_preparation_course_options }}",
            &options(&TEST_PREPARATION_COURSES),
        )
        .replace("{{ results }}", &results)
}

fn options(labels: &[&str]) -> String {
    labels
        .iter()
        .map(|label| {
            let label = escape_html(label);
            format!("                <option value=\"{label}\">{label}</option>")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
