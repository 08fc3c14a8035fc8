use std::io::{Read, Seek};

use actix_multipart::form::{MultipartForm, tempfile::TempFile};
use csv::Trim;
use pushkind_common::routes::empty_string_as_none;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::ingredient::NewIngredient;
use crate::forms::sanitize_inline_text;

/// Maximum length allowed for an ingredient name and its unit.
const NAME_MAX_LEN: usize = 200;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the ingredient form helpers.
pub type IngredientFormResult<T> = Result<T, IngredientFormError>;

/// Errors that can occur while processing ingredient forms.
#[derive(Debug, Error)]
pub enum IngredientFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("ingredient name cannot be empty")]
    EmptyName,
    #[error("measurement unit cannot be empty")]
    EmptyUnit,
    /// A CSV row lacked one of the two required values.
    #[error("row {row} must contain a name and a measurement unit")]
    UploadIncompleteRow { row: usize },
    #[error("upload contains no ingredients")]
    EmptyUpload,
    #[error("error reading csv file")]
    FileRead(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Payload for adding a single ingredient.
#[derive(Debug, Deserialize, Validate)]
pub struct AddIngredientForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub measurement_unit: String,
}

impl AddIngredientForm {
    /// Validates and sanitizes the payload into a domain `NewIngredient`.
    pub fn into_new_ingredient(self) -> IngredientFormResult<NewIngredient> {
        self.validate()?;
        build_ingredient(&self.name, &self.measurement_unit)
    }
}

#[derive(MultipartForm)]
/// Multipart form for uploading a CSV file with `name,measurement_unit` columns.
pub struct UploadIngredientsForm {
    #[multipart(limit = "10MB")]
    pub csv: TempFile,
}

impl UploadIngredientsForm {
    /// Parse the uploaded CSV file into a list of [`NewIngredient`] records.
    pub fn into_new_ingredients(&mut self) -> IngredientFormResult<Vec<NewIngredient>> {
        self.csv.file.rewind()?;
        parse_ingredients(self.csv.file.by_ref())
    }
}

#[derive(Deserialize)]
struct IngredientCsvRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    measurement_unit: Option<String>,
}

fn parse_ingredients<R: Read>(reader: R) -> IngredientFormResult<Vec<NewIngredient>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .from_reader(reader);

    let mut ingredients = Vec::new();

    for (index, row) in csv_reader.deserialize::<IngredientCsvRow>().enumerate() {
        let row_number = index + 2; // account for header row
        let record = row?;

        match (record.name, record.measurement_unit) {
            (Some(name), Some(unit)) => ingredients.push(build_ingredient(&name, &unit)?),
            (None, None) => continue,
            _ => return Err(IngredientFormError::UploadIncompleteRow { row: row_number }),
        }
    }

    if ingredients.is_empty() {
        return Err(IngredientFormError::EmptyUpload);
    }

    Ok(ingredients)
}

fn build_ingredient(name: &str, unit: &str) -> IngredientFormResult<NewIngredient> {
    let name = sanitize_inline_text(name);
    if name.is_empty() {
        return Err(IngredientFormError::EmptyName);
    }

    let unit = sanitize_inline_text(unit);
    if unit.is_empty() {
        return Err(IngredientFormError::EmptyUnit);
    }

    Ok(NewIngredient::new(name, unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};
    use tempfile::NamedTempFile;

    fn upload(csv: &str) -> UploadIngredientsForm {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(csv.as_bytes()).expect("write csv contents");
        file.as_file_mut()
            .seek(SeekFrom::Start(0))
            .expect("rewind csv");

        UploadIngredientsForm {
            csv: TempFile {
                file,
                content_type: None,
                file_name: Some("ingredients.csv".to_string()),
                size: csv.len(),
            },
        }
    }

    #[test]
    fn add_ingredient_form_sanitizes() {
        let form = AddIngredientForm {
            name: "  Brown   sugar ".to_string(),
            measurement_unit: " g ".to_string(),
        };

        let ingredient = form.into_new_ingredient().expect("valid form");

        assert_eq!(ingredient.name, "Brown sugar");
        assert_eq!(ingredient.measurement_unit, "g");
    }

    #[test]
    fn upload_parses_rows_and_skips_blank_lines() {
        let mut form = upload("name,measurement_unit\nFlour,g\n,\nMilk, ml \n");

        let ingredients = form.into_new_ingredients().expect("valid upload");

        assert_eq!(
            ingredients,
            vec![NewIngredient::new("Flour", "g"), NewIngredient::new("Milk", "ml")]
        );
    }

    #[test]
    fn upload_reports_incomplete_row() {
        let mut form = upload("name,measurement_unit\nFlour,g\nSalt,\n");

        let result = form.into_new_ingredients();

        assert!(matches!(
            result,
            Err(IngredientFormError::UploadIncompleteRow { row: 3 })
        ));
    }

    #[test]
    fn upload_rejects_empty_file() {
        let mut form = upload("name,measurement_unit\n");

        assert!(matches!(
            form.into_new_ingredients(),
            Err(IngredientFormError::EmptyUpload)
        ));
    }
}
