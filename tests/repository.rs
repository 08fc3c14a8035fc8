use pushkind_common::repository::errors::RepositoryError;

use foodgram::domain::ingredient::{Ingredient, IngredientListQuery, NewIngredient};
use foodgram::domain::recipe::{NewRecipe, Recipe, RecipeListQuery, UpdateRecipe};
use foodgram::domain::recipe_ingredient::{Amount, NewRecipeIngredient};
use foodgram::domain::relation::RelationKind;
use foodgram::domain::shopping_list::{aggregate, render};
use foodgram::domain::tag::{NewTag, Tag, UpdateTag};
use foodgram::domain::user::{NewUser, User, UserListQuery};
use foodgram::repository::{
    DieselRepository, IngredientReader, IngredientWriter, RecipeReader, RecipeWriter,
    RelationReader, RelationWriter, ShoppingListReader, TagReader, TagWriter, UserReader,
    UserWriter,
};

mod common;

fn create_user(repo: &DieselRepository, username: &str) -> User {
    repo.create_user(&NewUser::new(
        format!("{username}@example.com"),
        username,
        username,
        "Tester",
    ))
    .unwrap()
}

fn create_tag(repo: &DieselRepository, slug: &str, color: &str) -> Tag {
    repo.create_tag(&NewTag::new(slug.to_uppercase(), color, slug))
        .unwrap()
}

/// Seeds ingredients and returns them keyed by position.
fn create_ingredients(repo: &DieselRepository, items: &[(&str, &str)]) -> Vec<Ingredient> {
    let payload: Vec<NewIngredient> = items
        .iter()
        .map(|(name, unit)| NewIngredient::new(*name, *unit))
        .collect();
    assert_eq!(repo.create_ingredients(&payload).unwrap(), items.len());

    let all = repo.list_ingredients(IngredientListQuery::new()).unwrap();
    items
        .iter()
        .map(|(name, _)| {
            all.iter()
                .find(|ingredient| ingredient.name == *name)
                .cloned()
                .unwrap()
        })
        .collect()
}

fn create_recipe(
    repo: &DieselRepository,
    author: &User,
    name: &str,
    ingredients: &[(i32, i64)],
    tags: &[i32],
) -> Recipe {
    let new_recipe = NewRecipe::new(author.id, name, "/media/recipes/x.png", "Cook it.", 10)
        .with_ingredients(
            ingredients
                .iter()
                .map(|(id, tenths)| NewRecipeIngredient::new(*id, Amount::from_tenths(*tenths)))
                .collect(),
        )
        .with_tags(tags.to_vec());
    repo.create_recipe(&new_recipe).unwrap()
}

#[test]
fn test_recipe_create_and_read_round_trip() {
    let test_db = common::TestDb::new("test_recipe_create_and_read_round_trip.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let ingredients = create_ingredients(&repo, &[("Flour", "g"), ("Salt", "g")]);
    let breakfast = create_tag(&repo, "breakfast", "#ff0000");
    let lunch = create_tag(&repo, "lunch", "#00ff00");

    let created = create_recipe(
        &repo,
        &author,
        "Bread",
        &[(ingredients[0].id, 2000), (ingredients[1].id, 25)],
        &[lunch.id, breakfast.id],
    );

    let loaded = repo
        .get_recipe_by_id(created.id, None)
        .unwrap()
        .expect("recipe exists");

    assert_eq!(loaded.recipe, created);
    assert!(!loaded.is_favorited);
    assert!(!loaded.is_in_shopping_cart);
    assert_eq!(loaded.recipe.author_id, author.id);
    assert_eq!(loaded.recipe.name, "Bread");
    assert_eq!(loaded.recipe.ingredients.len(), 2);
    assert_eq!(loaded.recipe.ingredients[0].name, "Flour");
    assert_eq!(loaded.recipe.ingredients[0].amount, Amount::from_tenths(2000));
    assert_eq!(loaded.recipe.ingredients[1].name, "Salt");
    assert_eq!(loaded.recipe.ingredients[1].amount.to_string(), "2.5");
    let tag_ids: Vec<i32> = loaded.recipe.tags.iter().map(|tag| tag.id).collect();
    assert_eq!(tag_ids, vec![breakfast.id, lunch.id]);

    assert!(repo.get_recipe_by_id(created.id + 100, None).unwrap().is_none());
}

#[test]
fn test_recipe_update_replaces_only_supplied_parts() {
    let test_db = common::TestDb::new("test_recipe_update_replaces_only_supplied_parts.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let ingredients = create_ingredients(&repo, &[("Rice", "g"), ("Water", "ml")]);
    let dinner = create_tag(&repo, "dinner", "#0000ff");
    let recipe = create_recipe(
        &repo,
        &author,
        "Rice",
        &[(ingredients[0].id, 1000), (ingredients[1].id, 2000)],
        &[dinner.id],
    );

    let renamed = repo
        .update_recipe(recipe.id, &UpdateRecipe::new().name("Boiled rice"))
        .unwrap();
    assert_eq!(renamed.name, "Boiled rice");
    assert_eq!(renamed.ingredients, recipe.ingredients);
    assert_eq!(renamed.tags, recipe.tags);

    let replaced = repo
        .update_recipe(
            recipe.id,
            &UpdateRecipe::new().ingredients(vec![NewRecipeIngredient::new(
                ingredients[1].id,
                Amount::from_tenths(500),
            )]),
        )
        .unwrap();
    assert_eq!(replaced.ingredients.len(), 1);
    assert_eq!(replaced.ingredients[0].name, "Water");
    assert_eq!(replaced.tags.len(), 1);

    let cleared = repo
        .update_recipe(recipe.id, &UpdateRecipe::new().tags(Vec::new()))
        .unwrap();
    assert!(cleared.tags.is_empty());
    assert_eq!(cleared.ingredients.len(), 1);
    assert_eq!(cleared.name, "Boiled rice");

    let retagged = repo
        .update_recipe(recipe.id, &UpdateRecipe::new().tags(vec![dinner.id]))
        .unwrap();
    assert_eq!(retagged.tags.len(), 1);

    let emptied = repo
        .update_recipe(recipe.id, &UpdateRecipe::new().ingredients(Vec::new()))
        .unwrap();
    assert!(emptied.ingredients.is_empty());
    assert_eq!(emptied.tags.len(), 1);
    assert_eq!(emptied.tags[0].id, dinner.id);

    let reloaded = repo
        .get_recipe_by_id(recipe.id, None)
        .unwrap()
        .expect("recipe exists");
    assert!(reloaded.recipe.ingredients.is_empty());
    assert_eq!(reloaded.recipe.tags, emptied.tags);

    let err = repo
        .update_recipe(recipe.id + 100, &UpdateRecipe::new().cooking_time(5))
        .expect_err("missing recipe");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_recipe_write_is_atomic() {
    let test_db = common::TestDb::new("test_recipe_write_is_atomic.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let ingredients = create_ingredients(&repo, &[("Egg", "pcs")]);
    let egg = ingredients[0].id;

    let duplicate = NewRecipe::new(author.id, "Omelette", "/media/recipes/o.png", "Whisk.", 5)
        .with_ingredients(vec![
            NewRecipeIngredient::new(egg, Amount::from_tenths(20)),
            NewRecipeIngredient::new(egg, Amount::from_tenths(30)),
        ]);

    assert!(repo.create_recipe(&duplicate).is_err());

    let (total, items) = repo.list_recipes(RecipeListQuery::new(None)).unwrap();
    assert_eq!(total, 0);
    assert!(items.is_empty());

    let recipe = create_recipe(&repo, &author, "Omelette", &[(egg, 20)], &[]);
    let failed_update = repo.update_recipe(
        recipe.id,
        &UpdateRecipe::new().name("Scrambled").ingredients(vec![
            NewRecipeIngredient::new(egg, Amount::from_tenths(10)),
            NewRecipeIngredient::new(egg, Amount::from_tenths(10)),
        ]),
    );
    assert!(failed_update.is_err());

    let unchanged = repo.get_recipe_by_id(recipe.id, None).unwrap().unwrap();
    assert_eq!(unchanged.recipe.name, "Omelette");
    assert_eq!(unchanged.recipe.ingredients, recipe.ingredients);
}

#[test]
fn test_tag_filter_matches_any_tag_once() {
    let test_db = common::TestDb::new("test_tag_filter_matches_any_tag_once.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let other = create_user(&repo, "baker");
    let breakfast = create_tag(&repo, "breakfast", "#111111");
    let lunch = create_tag(&repo, "lunch", "#222222");

    let both = create_recipe(&repo, &author, "Both", &[], &[breakfast.id, lunch.id]);
    let lunch_only = create_recipe(&repo, &other, "Lunch", &[], &[lunch.id]);
    let untagged = create_recipe(&repo, &author, "None", &[], &[]);

    let (total, items) = repo
        .list_recipes(RecipeListQuery::new(None).tags(["breakfast", "lunch"]))
        .unwrap();
    let ids: Vec<i32> = items.iter().map(|item| item.recipe.id).collect();
    assert_eq!(total, 2);
    assert_eq!(ids, vec![lunch_only.id, both.id]);

    let (_, items) = repo
        .list_recipes(RecipeListQuery::new(None).tags(["breakfast"]))
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].recipe.id, both.id);

    let (_, items) = repo
        .list_recipes(RecipeListQuery::new(None).tags(["unknown"]))
        .unwrap();
    assert!(items.is_empty());

    let (total, items) = repo
        .list_recipes(RecipeListQuery::new(None).author(author.id))
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(items[0].recipe.id, untagged.id);

    let (total, items) = repo
        .list_recipes(RecipeListQuery::new(None).paginate(2, 2))
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].recipe.id, both.id);
}

#[test]
fn test_annotations_follow_viewer_relations() {
    let test_db = common::TestDb::new("test_annotations_follow_viewer_relations.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let viewer = create_user(&repo, "viewer");
    let stranger = create_user(&repo, "stranger");
    let favorite = create_recipe(&repo, &author, "Favorite", &[], &[]);
    let in_cart = create_recipe(&repo, &author, "Cart", &[], &[]);
    let plain = create_recipe(&repo, &author, "Plain", &[], &[]);

    assert!(repo
        .add_relation(RelationKind::Favorite, viewer.id, favorite.id)
        .unwrap());
    assert!(repo
        .add_relation(RelationKind::ShoppingCart, viewer.id, in_cart.id)
        .unwrap());

    let (_, items) = repo.list_recipes(RecipeListQuery::new(Some(viewer.id))).unwrap();
    for item in &items {
        assert_eq!(item.is_favorited, item.recipe.id == favorite.id);
        assert_eq!(item.is_in_shopping_cart, item.recipe.id == in_cart.id);
    }

    let (_, items) = repo
        .list_recipes(RecipeListQuery::new(Some(stranger.id)))
        .unwrap();
    assert!(items.iter().all(|item| !item.is_favorited && !item.is_in_shopping_cart));

    let anonymous = repo.get_recipe_by_id(favorite.id, None).unwrap().unwrap();
    assert!(!anonymous.is_favorited);
    let seen = repo
        .get_recipe_by_id(favorite.id, Some(viewer.id))
        .unwrap()
        .unwrap();
    assert!(seen.is_favorited);
    assert!(!seen.is_in_shopping_cart);

    let (total, items) = repo
        .list_recipes(RecipeListQuery::new(Some(viewer.id)).favorited(true))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(items[0].recipe.id, favorite.id);

    let (total, _) = repo
        .list_recipes(RecipeListQuery::new(Some(viewer.id)).favorited(false))
        .unwrap();
    assert_eq!(total, 2);

    let (_, items) = repo
        .list_recipes(
            RecipeListQuery::new(Some(viewer.id))
                .favorited(false)
                .in_shopping_cart(false),
        )
        .unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].recipe.id, plain.id);

    let (total, _) = repo
        .list_recipes(RecipeListQuery::new(None).in_shopping_cart(true))
        .unwrap();
    assert_eq!(total, 0);

    let (total, _) = repo
        .list_recipes(RecipeListQuery::new(None).favorited(false))
        .unwrap();
    assert_eq!(total, 3);
}

#[test]
fn test_relation_toggle_sequences() {
    let test_db = common::TestDb::new("test_relation_toggle_sequences.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let reader = create_user(&repo, "reader");
    let recipe = create_recipe(&repo, &author, "Stew", &[], &[]);

    for (kind, target) in [
        (RelationKind::Favorite, recipe.id),
        (RelationKind::ShoppingCart, recipe.id),
        (RelationKind::Subscription, author.id),
    ] {
        assert!(repo.add_relation(kind, reader.id, target).unwrap(), "{kind}");
        assert!(!repo.add_relation(kind, reader.id, target).unwrap(), "{kind}");

        let related = repo
            .related_target_ids(kind, reader.id, &[target, target + 100])
            .unwrap();
        assert_eq!(related.len(), 1);
        assert!(related.contains(&target));

        assert!(repo.remove_relation(kind, reader.id, target).unwrap(), "{kind}");
        assert!(!repo.remove_relation(kind, reader.id, target).unwrap(), "{kind}");
        assert!(repo
            .related_target_ids(kind, reader.id, &[target])
            .unwrap()
            .is_empty());

        assert!(repo.add_relation(kind, reader.id, target).unwrap(), "{kind}");
        assert!(repo
            .related_target_ids(kind, reader.id, &[target])
            .unwrap()
            .contains(&target));
    }
}

#[test]
fn test_shopping_list_sums_cart_ingredients() {
    let test_db = common::TestDb::new("test_shopping_list_sums_cart_ingredients.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let shopper = create_user(&repo, "shopper");
    let ingredients = create_ingredients(&repo, &[("Salt", "g"), ("Potato", "pcs")]);
    let salt = ingredients[0].id;
    let potato = ingredients[1].id;

    let soup = create_recipe(&repo, &author, "Soup", &[(salt, 100), (potato, 30)], &[]);
    let fries = create_recipe(&repo, &author, "Fries", &[(salt, 150), (potato, 50)], &[]);
    let skipped = create_recipe(&repo, &author, "Skipped", &[(salt, 990)], &[]);

    assert!(repo.list_shopping_list_rows(shopper.id).unwrap().is_empty());

    repo.add_relation(RelationKind::ShoppingCart, shopper.id, soup.id)
        .unwrap();
    repo.add_relation(RelationKind::ShoppingCart, shopper.id, fries.id)
        .unwrap();
    repo.add_relation(RelationKind::ShoppingCart, author.id, skipped.id)
        .unwrap();

    let rows = repo.list_shopping_list_rows(shopper.id).unwrap();
    assert_eq!(rows.len(), 4);

    assert_eq!(render(&aggregate(rows)), "Salt - 25 g\nPotato - 8 pcs");
}

#[test]
fn test_delete_recipe_removes_dependents() {
    let test_db = common::TestDb::new("test_delete_recipe_removes_dependents.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let fan = create_user(&repo, "fan");
    let ingredients = create_ingredients(&repo, &[("Cocoa", "g")]);
    let tag = create_tag(&repo, "dessert", "#333333");
    let recipe = create_recipe(&repo, &author, "Cake", &[(ingredients[0].id, 50)], &[tag.id]);

    repo.add_relation(RelationKind::Favorite, fan.id, recipe.id)
        .unwrap();
    repo.add_relation(RelationKind::ShoppingCart, fan.id, recipe.id)
        .unwrap();

    repo.delete_recipe(recipe.id).unwrap();

    assert!(repo.get_recipe_by_id(recipe.id, None).unwrap().is_none());
    assert!(repo.list_shopping_list_rows(fan.id).unwrap().is_empty());
    assert!(repo
        .related_target_ids(RelationKind::Favorite, fan.id, &[recipe.id])
        .unwrap()
        .is_empty());
    assert!(repo.get_tag_by_id(tag.id).unwrap().is_some());

    let err = repo.delete_recipe(recipe.id).expect_err("already deleted");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_tag_repository_crud() {
    let test_db = common::TestDb::new("test_tag_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());
    let author = create_user(&repo, "chef");
    let tag = create_tag(&repo, "brunch", "#ABCDEF");
    assert_eq!(tag.color, "#abcdef");

    let recipe = create_recipe(&repo, &author, "Eggs", &[], &[tag.id]);

    let updated = repo
        .update_tag(
            tag.id,
            &UpdateTag {
                name: Some("Late breakfast".to_string()),
                ..UpdateTag::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Late breakfast");
    assert_eq!(updated.slug, "brunch");

    let fetched = repo.get_tags_by_ids(&[tag.id, tag.id + 100]).unwrap();
    assert_eq!(fetched, vec![updated.clone()]);

    repo.delete_tag(tag.id).unwrap();
    assert!(repo.list_tags().unwrap().is_empty());
    let recipe = repo.get_recipe_by_id(recipe.id, None).unwrap().unwrap();
    assert!(recipe.recipe.tags.is_empty());

    let err = repo.delete_tag(tag.id).expect_err("already deleted");
    assert!(matches!(err, RepositoryError::NotFound));
    let err = repo
        .update_tag(tag.id, &UpdateTag::default())
        .expect_err("missing tag");
    assert!(matches!(err, RepositoryError::NotFound));
}

#[test]
fn test_ingredient_prefix_search_ignores_case() {
    let test_db = common::TestDb::new("test_ingredient_prefix_search_ignores_case.db");
    let repo = DieselRepository::new(test_db.pool());
    create_ingredients(
        &repo,
        &[("Sugar", "g"), ("sugar syrup", "ml"), ("Brown sugar", "g")],
    );

    let found = repo
        .list_ingredients(IngredientListQuery::new().name_prefix("SUG"))
        .unwrap();
    let names: Vec<&str> = found.iter().map(|item| item.name.as_str()).collect();
    assert_eq!(names, vec!["Sugar", "sugar syrup"]);

    let all = repo.list_ingredients(IngredientListQuery::new()).unwrap();
    assert_eq!(all.len(), 3);
    assert!(repo.get_ingredient_by_id(all[0].id).unwrap().is_some());
}

#[test]
fn test_user_listing_and_summaries() {
    let test_db = common::TestDb::new("test_user_listing_and_summaries.db");
    let repo = DieselRepository::new(test_db.pool());
    let anna = create_user(&repo, "anna");
    let boris = create_user(&repo, "boris");
    let reader = create_user(&repo, "reader");

    repo.add_relation(RelationKind::Subscription, reader.id, boris.id)
        .unwrap();
    let first = create_recipe(&repo, &boris, "First", &[], &[]);
    let second = create_recipe(&repo, &boris, "Second", &[], &[]);
    create_recipe(&repo, &anna, "Other", &[], &[]);

    let (total, users) = repo.list_users(UserListQuery::new()).unwrap();
    assert_eq!(total, 3);
    assert_eq!(users[0].id, anna.id);

    let (total, followed) = repo
        .list_users(UserListQuery::new().subscribed_by(reader.id))
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(followed, vec![boris.clone()]);

    let summaries = repo.list_recipe_summaries(&[boris.id]).unwrap();
    let ids: Vec<i32> = summaries.iter().map(|summary| summary.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);

    assert_eq!(
        repo.get_user_by_email("  ANNA@example.com ").unwrap(),
        Some(anna)
    );
}
