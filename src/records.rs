use polars::prelude::{DataFrame, DataType, Field, NamedFrom, PolarsResult, Schema, Series};
use serde::{Deserialize, Serialize};

pub static GENDERS: [&str; 2] = ["female", "male"];
pub static RACE_ETHNICITIES: [&str; 5] = ["group A", "group B", "group C", "group D", "group E"];
pub static PARENTAL_LEVELS_OF_EDUCATION: [&str; 6] = [
    "associate's degree",
    "bachelor's degree",
    "high school",
    "master's degree",
    "some college",
    "some high school",
];
pub static LUNCHES: [&str; 2] = ["free/reduced", "standard"];
pub static TEST_PREPARATION_COURSES: [&str; 2] = ["completed", "none"];

/// Columns the preprocessor scales, in output order.
pub static NUMERICAL_COLUMNS: [&str; 2] = ["writing_score", "reading_score"];
/// Columns the preprocessor one-hot encodes, in output order.
pub static CATEGORICAL_COLUMNS: [&str; 5] = [
    "gender",
    "race_ethnicity",
    "parental_level_of_education",
    "lunch",
    "test_preparation_course",
];

/// One student, as submitted through the form.
///
/// Nothing is checked here. A label the preprocessor was never fit on is
/// rejected when the table is transformed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomData {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: f64,
    pub writing_score: f64,
}

impl CustomData {
    pub fn new(
        gender: impl Into<String>,
        race_ethnicity: impl Into<String>,
        parental_level_of_education: impl Into<String>,
        lunch: impl Into<String>,
        test_preparation_course: impl Into<String>,
        reading_score: f64,
        writing_score: f64,
    ) -> Self {
        Self {
            gender: gender.into(),
            race_ethnicity: race_ethnicity.into(),
            parental_level_of_education: parental_level_of_education.into(),
            lunch: lunch.into(),
            test_preparation_course: test_preparation_course.into(),
            reading_score,
            writing_score,
        }
    }

    /// Single-row table in the column order of [`CustomData::schema`].
    pub fn get_data_as_data_frame(&self) -> PolarsResult<DataFrame> {
        DataFrame::new(vec![
            Series::new("gender", &[self.gender.as_str()]),
            Series::new("race_ethnicity", &[self.race_ethnicity.as_str()]),
            Series::new(
                "parental_level_of_education",
                &[self.parental_level_of_education.as_str()],
            ),
            Series::new("lunch", &[self.lunch.as_str()]),
            Series::new(
                "test_preparation_course",
                &[self.test_preparation_course.as_str()],
            ),
            Series::new("reading_score", &[self.reading_score]),
            Series::new("writing_score", &[self.writing_score]),
        ])
    }

    pub fn schema() -> Schema {
        Schema::from_iter(vec![
            Field::new("gender", DataType::Utf8),
            Field::new("race_ethnicity", DataType::Utf8),
            Field::new("parental_level_of_education", DataType::Utf8),
            Field::new("lunch", DataType::Utf8),
            Field::new("test_preparation_course", DataType::Utf8),
            Field::new("reading_score", DataType::Float64),
            Field::new("writing_score", DataType::Float64),
        ])
    }
}
