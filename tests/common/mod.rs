use std::path::Path;

use polars::prelude::{DataFrame, NamedFrom, Series};
use student_performance::pipeline::PredictPipeline;
use student_performance::records::{
    CATEGORICAL_COLUMNS, GENDERS, LUNCHES, NUMERICAL_COLUMNS, PARENTAL_LEVELS_OF_EDUCATION,
    RACE_ETHNICITIES, TEST_PREPARATION_COURSES,
};
use student_performance::{save_object, CustomData, Preprocessor, RegressionModel};

pub fn student(i: usize) -> CustomData {
    CustomData::new(
        GENDERS[i % GENDERS.len()],
        RACE_ETHNICITIES[i % RACE_ETHNICITIES.len()],
        PARENTAL_LEVELS_OF_EDUCATION[i % PARENTAL_LEVELS_OF_EDUCATION.len()],
        LUNCHES[(i / 2) % LUNCHES.len()],
        TEST_PREPARATION_COURSES[(i / 3) % TEST_PREPARATION_COURSES.len()],
        (40 + (i * 7) % 55) as f64,
        (35 + (i * 11) % 60) as f64,
    )
}

fn math_score(data: &CustomData) -> f64 {
    let mut score = 0.45 * data.reading_score + 0.45 * data.writing_score;
    if data.gender == "male" {
        score += 5.0;
    }
    if data.lunch == "standard" {
        score += 8.0;
    }
    if data.test_preparation_course == "completed" {
        score += 4.0;
    }
    score
}

fn labels<'a>(students: &'a [CustomData], f: fn(&'a CustomData) -> &'a str) -> Vec<&'a str> {
    students.iter().map(f).collect()
}

pub fn training_frame(rows: usize) -> (DataFrame, Vec<f64>) {
    let students: Vec<CustomData> = (0..rows).map(student).collect();
    let df = DataFrame::new(vec![
        Series::new("gender", labels(&students, |s| s.gender.as_str())),
        Series::new("race_ethnicity", labels(&students, |s| s.race_ethnicity.as_str())),
        Series::new(
            "parental_level_of_education",
            labels(&students, |s| s.parental_level_of_education.as_str()),
        ),
        Series::new("lunch", labels(&students, |s| s.lunch.as_str())),
        Series::new(
            "test_preparation_course",
            labels(&students, |s| s.test_preparation_course.as_str()),
        ),
        Series::new(
            "reading_score",
            students.iter().map(|s| s.reading_score).collect::<Vec<f64>>(),
        ),
        Series::new(
            "writing_score",
            students.iter().map(|s| s.writing_score).collect::<Vec<f64>>(),
        ),
    ])
    .unwrap();
    let y = students.iter().map(math_score).collect();
    (df, y)
}

/// Fit a preprocessor and a ridge model on synthetic students and save both
/// where a pipeline pointed at `dir` expects them.
pub fn write_artifacts(dir: &Path) -> PredictPipeline {
    let (df, y) = training_frame(60);
    let preprocessor = Preprocessor::fit(&df, &NUMERICAL_COLUMNS, &CATEGORICAL_COLUMNS).unwrap();
    let x = preprocessor.transform(&df).unwrap();
    let model = RegressionModel::fit_ridge(&x, &y, 1.0).unwrap();

    let pipeline = PredictPipeline::with_artifacts_dir(dir);
    save_object(pipeline.preprocessor_path(), &preprocessor).unwrap();
    save_object(pipeline.model_path(), &model).unwrap();
    pipeline
}

pub fn documented_student() -> CustomData {
    CustomData::new(
        "male",
        "group A",
        "bachelor's degree",
        "standard",
        "completed",
        75.0,
        80.0,
    )
}
