use std::collections::{HashMap, HashSet};

use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::recipe::{
        AnnotatedRecipe, NewRecipe as DomainNewRecipe, Recipe as DomainRecipe, RecipeListQuery,
        RecipeSummary as DomainRecipeSummary, UpdateRecipe as DomainUpdateRecipe,
    },
    domain::recipe_ingredient::{
        NewRecipeIngredient as DomainNewRecipeIngredient,
        RecipeIngredient as DomainRecipeIngredient,
    },
    domain::relation::RelationKind,
    domain::tag::Tag as DomainTag,
    models::ingredient::Ingredient as DbIngredient,
    models::recipe::{NewRecipe as DbNewRecipe, Recipe as DbRecipe, UpdateRecipe as DbUpdateRecipe},
    models::recipe_ingredient::{
        NewRecipeIngredient as DbNewRecipeIngredient, RecipeIngredient as DbRecipeIngredient,
    },
    models::recipe_tag::{NewRecipeTag as DbNewRecipeTag, RecipeTag as DbRecipeTag},
    models::tag::Tag as DbTag,
    repository::relation::load_related_target_ids,
    repository::{DieselRepository, RecipeReader, RecipeWriter},
    schema::recipes,
};

impl RecipeReader for DieselRepository {
    fn get_recipe_by_id(
        &self,
        id: i32,
        viewer_id: Option<i32>,
    ) -> RepositoryResult<Option<AnnotatedRecipe>> {
        let mut conn = self.conn()?;
        let recipe = recipes::table
            .filter(recipes::id.eq(id))
            .first::<DbRecipe>(&mut conn)
            .optional()?;

        let Some(recipe) = recipe else {
            return Ok(None);
        };

        let mut annotated = annotate_recipes(&mut conn, vec![recipe], viewer_id)?;
        Ok(annotated.pop())
    }

    fn list_recipes(
        &self,
        query: RecipeListQuery,
    ) -> RepositoryResult<(usize, Vec<AnnotatedRecipe>)> {
        let mut conn = self.conn()?;

        let total = apply_filters(recipes::table.into_boxed::<Sqlite>(), &query)
            .count()
            .get_result::<i64>(&mut conn)? as usize;

        let mut items = apply_filters(recipes::table.into_boxed::<Sqlite>(), &query)
            .order((recipes::pub_date.desc(), recipes::id.desc()));

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_recipes = items.load::<DbRecipe>(&mut conn)?;

        if db_recipes.is_empty() {
            return Ok((total, Vec::new()));
        }

        let recipes = annotate_recipes(&mut conn, db_recipes, query.viewer_id)?;
        Ok((total, recipes))
    }

    fn list_recipe_summaries(
        &self,
        author_ids: &[i32],
    ) -> RepositoryResult<Vec<DomainRecipeSummary>> {
        if author_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let rows = recipes::table
            .filter(recipes::author_id.eq_any(author_ids))
            .order((recipes::pub_date.desc(), recipes::id.desc()))
            .load::<DbRecipe>(&mut conn)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

impl RecipeWriter for DieselRepository {
    fn create_recipe(&self, new_recipe: &DomainNewRecipe) -> RepositoryResult<DomainRecipe> {
        let mut conn = self.conn()?;

        conn.transaction::<DomainRecipe, RepositoryError, _>(|conn| {
            let db_new = DbNewRecipe::from(new_recipe);

            let created = diesel::insert_into(recipes::table)
                .values(&db_new)
                .get_result::<DbRecipe>(conn)?;

            insert_ingredients(conn, created.id, &new_recipe.ingredients)?;
            insert_tags(conn, created.id, &new_recipe.tag_ids)?;

            expand_recipe(conn, created)
        })
    }

    fn update_recipe(
        &self,
        recipe_id: i32,
        updates: &DomainUpdateRecipe,
    ) -> RepositoryResult<DomainRecipe> {
        use crate::schema::{recipe_ingredients, recipe_tags};

        let mut conn = self.conn()?;

        conn.transaction::<DomainRecipe, RepositoryError, _>(|conn| {
            let db_updates = DbUpdateRecipe::from(updates);

            let updated = diesel::update(recipes::table.filter(recipes::id.eq(recipe_id)))
                .set(&db_updates)
                .get_result::<DbRecipe>(conn)
                .optional()?;

            let Some(updated) = updated else {
                return Err(RepositoryError::NotFound);
            };

            if let Some(ingredients) = updates.ingredients.as_ref() {
                diesel::delete(
                    recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
                )
                .execute(conn)?;
                insert_ingredients(conn, recipe_id, ingredients)?;
            }

            if let Some(tag_ids) = updates.tag_ids.as_ref() {
                diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
                    .execute(conn)?;
                insert_tags(conn, recipe_id, tag_ids)?;
            }

            expand_recipe(conn, updated)
        })
    }

    fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()> {
        use crate::schema::{favorites, recipe_ingredients, recipe_tags, shopping_carts};

        let mut conn = self.conn()?;

        conn.transaction::<(), RepositoryError, _>(|conn| {
            diesel::delete(
                recipe_ingredients::table.filter(recipe_ingredients::recipe_id.eq(recipe_id)),
            )
            .execute(conn)?;
            diesel::delete(recipe_tags::table.filter(recipe_tags::recipe_id.eq(recipe_id)))
                .execute(conn)?;
            diesel::delete(favorites::table.filter(favorites::recipe_id.eq(recipe_id)))
                .execute(conn)?;
            diesel::delete(shopping_carts::table.filter(shopping_carts::recipe_id.eq(recipe_id)))
                .execute(conn)?;

            let deleted =
                diesel::delete(recipes::table.filter(recipes::id.eq(recipe_id))).execute(conn)?;
            if deleted == 0 {
                return Err(RepositoryError::NotFound);
            }

            Ok(())
        })
    }
}

/// Narrows a recipe query by tag slugs, author and the viewer's relations.
fn apply_filters<'a>(
    mut items: recipes::BoxedQuery<'a, Sqlite>,
    query: &RecipeListQuery,
) -> recipes::BoxedQuery<'a, Sqlite> {
    use crate::schema::{favorites, recipe_tags, shopping_carts, tags};

    if !query.tags.is_empty() {
        // IN (subselect) keeps a recipe once even when several of its tags match
        items = items.filter(
            recipes::id.eq_any(
                recipe_tags::table
                    .filter(
                        recipe_tags::tag_id.eq_any(
                            tags::table
                                .filter(tags::slug.eq_any(query.tags.clone()))
                                .select(tags::id),
                        ),
                    )
                    .select(recipe_tags::recipe_id),
            ),
        );
    }

    if let Some(author_id) = query.author_id {
        items = items.filter(recipes::author_id.eq(author_id));
    }

    match (query.is_favorited, query.viewer_id) {
        (Some(true), Some(viewer)) => {
            items = items.filter(
                recipes::id.eq_any(
                    favorites::table
                        .filter(favorites::user_id.eq(viewer))
                        .select(favorites::recipe_id),
                ),
            );
        }
        (Some(false), Some(viewer)) => {
            items = items.filter(
                recipes::id.ne_all(
                    favorites::table
                        .filter(favorites::user_id.eq(viewer))
                        .select(favorites::recipe_id),
                ),
            );
        }
        // anonymous viewers have no favorites
        (Some(true), None) => items = items.filter(recipes::id.eq_any(Vec::<i32>::new())),
        (Some(false), None) | (None, _) => {}
    }

    match (query.is_in_shopping_cart, query.viewer_id) {
        (Some(true), Some(viewer)) => {
            items = items.filter(
                recipes::id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(viewer))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
        (Some(false), Some(viewer)) => {
            items = items.filter(
                recipes::id.ne_all(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(viewer))
                        .select(shopping_carts::recipe_id),
                ),
            );
        }
        (Some(true), None) => items = items.filter(recipes::id.eq_any(Vec::<i32>::new())),
        (Some(false), None) | (None, _) => {}
    }

    items
}

/// Expands recipe rows and attaches the viewer's favorite and cart flags.
///
/// Runs a fixed number of queries regardless of how many recipes are passed.
fn annotate_recipes(
    conn: &mut SqliteConnection,
    rows: Vec<DbRecipe>,
    viewer_id: Option<i32>,
) -> RepositoryResult<Vec<AnnotatedRecipe>> {
    let recipe_ids: Vec<i32> = rows.iter().map(|recipe| recipe.id).collect();

    let mut ingredients = load_ingredients_for_recipes(conn, &recipe_ids)?;
    let mut tags = load_tags_for_recipes(conn, &recipe_ids)?;

    let (favorited, in_cart) = match viewer_id {
        Some(viewer) => (
            load_related_target_ids(conn, RelationKind::Favorite, viewer, &recipe_ids)?,
            load_related_target_ids(conn, RelationKind::ShoppingCart, viewer, &recipe_ids)?,
        ),
        None => (HashSet::new(), HashSet::new()),
    };

    let annotated = rows
        .into_iter()
        .map(|row| {
            let mut recipe: DomainRecipe = row.into();
            recipe.ingredients = ingredients.remove(&recipe.id).unwrap_or_default();
            recipe.tags = tags.remove(&recipe.id).unwrap_or_default();
            AnnotatedRecipe {
                is_favorited: favorited.contains(&recipe.id),
                is_in_shopping_cart: in_cart.contains(&recipe.id),
                recipe,
            }
        })
        .collect();

    Ok(annotated)
}

fn expand_recipe(conn: &mut SqliteConnection, row: DbRecipe) -> RepositoryResult<DomainRecipe> {
    let recipe_id = row.id;
    let mut recipe: DomainRecipe = row.into();
    recipe.ingredients = load_ingredients_for_recipes(conn, &[recipe_id])?
        .remove(&recipe_id)
        .unwrap_or_default();
    recipe.tags = load_tags_for_recipes(conn, &[recipe_id])?
        .remove(&recipe_id)
        .unwrap_or_default();
    Ok(recipe)
}

fn insert_ingredients(
    conn: &mut SqliteConnection,
    recipe_id: i32,
    ingredients: &[DomainNewRecipeIngredient],
) -> RepositoryResult<()> {
    use crate::schema::recipe_ingredients;

    if ingredients.is_empty() {
        return Ok(());
    }

    let payload: Vec<DbNewRecipeIngredient> = ingredients
        .iter()
        .map(|ingredient| DbNewRecipeIngredient::from_domain(recipe_id, ingredient))
        .collect();

    diesel::insert_into(recipe_ingredients::table)
        .values(&payload)
        .execute(conn)?;

    Ok(())
}

fn insert_tags(conn: &mut SqliteConnection, recipe_id: i32, tag_ids: &[i32]) -> RepositoryResult<()> {
    use crate::schema::recipe_tags;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let payload: Vec<DbNewRecipeTag> = tag_ids
        .iter()
        .map(|tag_id| DbNewRecipeTag::new(recipe_id, *tag_id))
        .collect();

    diesel::insert_into(recipe_tags::table)
        .values(&payload)
        .execute(conn)?;

    Ok(())
}

fn load_ingredients_for_recipes(
    conn: &mut SqliteConnection,
    recipe_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DomainRecipeIngredient>>> {
    use crate::schema::{ingredients, recipe_ingredients};

    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(recipe_ids))
        .order(recipe_ingredients::id.asc())
        .select((DbRecipeIngredient::as_select(), DbIngredient::as_select()))
        .load::<(DbRecipeIngredient, DbIngredient)>(conn)?;

    let mut map: HashMap<i32, Vec<DomainRecipeIngredient>> = HashMap::new();
    for (row, ingredient) in rows {
        map.entry(row.recipe_id)
            .or_default()
            .push((row, ingredient).into());
    }

    Ok(map)
}

fn load_tags_for_recipes(
    conn: &mut SqliteConnection,
    recipe_ids: &[i32],
) -> RepositoryResult<HashMap<i32, Vec<DomainTag>>> {
    use crate::schema::{recipe_tags, tags};

    if recipe_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = recipe_tags::table
        .inner_join(tags::table)
        .filter(recipe_tags::recipe_id.eq_any(recipe_ids))
        .order(tags::id.asc())
        .select((DbRecipeTag::as_select(), DbTag::as_select()))
        .load::<(DbRecipeTag, DbTag)>(conn)?;

    let mut map: HashMap<i32, Vec<DomainTag>> = HashMap::new();
    for (link, tag) in rows {
        map.entry(link.recipe_id).or_default().push(tag.into());
    }

    Ok(map)
}
