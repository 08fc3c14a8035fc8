use serde::{Deserialize, Serialize};

/// Reference tag that recipes can be labelled with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    /// Unique identifier of the tag.
    pub id: i32,
    /// Human-readable name of the tag.
    pub name: String,
    /// Display colour in `#RRGGBB` form.
    pub color: String,
    /// URL-safe identifier used by recipe filters.
    pub slug: String,
}

/// Payload required to insert a new tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

impl NewTag {
    /// Construct a new tag payload with trimmed fields and a lowercase colour.
    pub fn new(
        name: impl Into<String>,
        color: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            color: color.into().trim().to_lowercase(),
            slug: slug.into().trim().to_string(),
        }
    }
}

/// Patch data applied when updating an existing tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub color: Option<String>,
    pub slug: Option<String>,
}
