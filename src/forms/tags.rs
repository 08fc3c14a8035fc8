use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::tag::{NewTag, UpdateTag};
use crate::forms::sanitize_inline_text;

/// Maximum allowed length for a tag name and slug.
const NAME_MAX_LEN: usize = 200;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the tag form helpers.
pub type TagFormResult<T> = Result<T, TagFormError>;

/// Errors that can occur while processing tag forms.
#[derive(Debug, Error)]
pub enum TagFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    /// The provided name is empty after sanitization.
    #[error("tag name cannot be empty")]
    EmptyName,
}

/// Payload for creating a tag.
#[derive(Debug, Deserialize, Validate)]
pub struct AddTagForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    /// Hex colour in `#RRGGBB` form.
    #[validate(custom(function = "validate_color"))]
    pub color: String,
    #[validate(
        length(min = 1, max = NAME_MAX_LEN_VALIDATOR),
        custom(function = "validate_slug")
    )]
    pub slug: String,
}

impl AddTagForm {
    /// Validates and sanitizes the payload into a domain `NewTag`.
    pub fn into_new_tag(self) -> TagFormResult<NewTag> {
        self.validate()?;

        let sanitized_name = sanitize_inline_text(&self.name);
        if sanitized_name.is_empty() {
            return Err(TagFormError::EmptyName);
        }

        Ok(NewTag::new(sanitized_name, self.color, self.slug))
    }
}

/// Payload for editing a tag. Omitted fields stay untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditTagForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_color"))]
    pub color: Option<String>,
    #[validate(
        length(min = 1, max = NAME_MAX_LEN_VALIDATOR),
        custom(function = "validate_slug")
    )]
    pub slug: Option<String>,
}

impl EditTagForm {
    /// Validates and sanitizes the payload into a domain `UpdateTag`.
    pub fn into_update_tag(self) -> TagFormResult<UpdateTag> {
        self.validate()?;

        let name = match self.name.as_deref() {
            Some(raw) => {
                let sanitized = sanitize_inline_text(raw);
                if sanitized.is_empty() {
                    return Err(TagFormError::EmptyName);
                }
                Some(sanitized)
            }
            None => None,
        };

        Ok(UpdateTag {
            name,
            color: self.color.map(|color| color.to_lowercase()),
            slug: self.slug,
        })
    }
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("color"))
    }
}

fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("slug"))
    }
}
