use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::recipe::{
    NewRecipe as DomainNewRecipe, Recipe as DomainRecipe, RecipeSummary as DomainRecipeSummary,
    UpdateRecipe as DomainUpdateRecipe,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(
    table_name = crate::schema::recipes,
    belongs_to(super::user::User, foreign_key = author_id)
)]
pub struct Recipe {
    pub id: i32,
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipes)]
pub struct NewRecipe<'a> {
    pub author_id: i32,
    pub name: &'a str,
    pub image: &'a str,
    pub text: &'a str,
    pub cooking_time: i32,
    pub pub_date: NaiveDate,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::recipes)]
pub struct UpdateRecipe<'a> {
    pub name: Option<&'a str>,
    pub image: Option<&'a str>,
    pub text: Option<&'a str>,
    pub cooking_time: Option<i32>,
    pub updated_at: NaiveDateTime,
}

impl From<Recipe> for DomainRecipe {
    fn from(value: Recipe) -> Self {
        Self {
            id: value.id,
            author_id: value.author_id,
            name: value.name,
            image: value.image,
            text: value.text,
            cooking_time: value.cooking_time,
            pub_date: value.pub_date,
            ingredients: Vec::new(),
            tags: Vec::new(),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<Recipe> for DomainRecipeSummary {
    fn from(value: Recipe) -> Self {
        Self {
            id: value.id,
            author_id: value.author_id,
            name: value.name,
            image: value.image,
            cooking_time: value.cooking_time,
        }
    }
}

impl<'a> From<&'a DomainNewRecipe> for NewRecipe<'a> {
    fn from(value: &'a DomainNewRecipe) -> Self {
        Self {
            author_id: value.author_id,
            name: value.name.as_str(),
            image: value.image.as_str(),
            text: value.text.as_str(),
            cooking_time: value.cooking_time,
            pub_date: value.pub_date,
        }
    }
}

impl<'a> From<&'a DomainUpdateRecipe> for UpdateRecipe<'a> {
    fn from(value: &'a DomainUpdateRecipe) -> Self {
        Self {
            name: value.name.as_deref(),
            image: value.image.as_deref(),
            text: value.text.as_deref(),
            cooking_time: value.cooking_time,
            updated_at: value.updated_at,
        }
    }
}
