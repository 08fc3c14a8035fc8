use std::collections::HashSet;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::SqliteConnection;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::relation::RelationKind,
    models::favorite::NewFavorite,
    models::shopping_cart::NewShoppingCart,
    models::subscription::NewSubscription,
    repository::{DieselRepository, RelationReader, RelationWriter},
};

impl RelationReader for DieselRepository {
    fn related_target_ids(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>> {
        if target_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let mut conn = self.conn()?;
        load_related_target_ids(&mut conn, kind, actor_id, target_ids)
    }
}

impl RelationWriter for DieselRepository {
    fn add_relation(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_id: i32,
    ) -> RepositoryResult<bool> {
        use crate::schema::{favorites, shopping_carts, subscriptions};

        let mut conn = self.conn()?;

        let inserted = match kind {
            RelationKind::Favorite => diesel::insert_into(favorites::table)
                .values(&NewFavorite {
                    user_id: actor_id,
                    recipe_id: target_id,
                })
                .execute(&mut conn),
            RelationKind::ShoppingCart => diesel::insert_into(shopping_carts::table)
                .values(&NewShoppingCart {
                    user_id: actor_id,
                    recipe_id: target_id,
                })
                .execute(&mut conn),
            RelationKind::Subscription => diesel::insert_into(subscriptions::table)
                .values(&NewSubscription {
                    user_id: actor_id,
                    author_id: target_id,
                })
                .execute(&mut conn),
        };

        match inserted {
            Ok(_) => Ok(true),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn remove_relation(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_id: i32,
    ) -> RepositoryResult<bool> {
        use crate::schema::{favorites, shopping_carts, subscriptions};

        let mut conn = self.conn()?;

        let deleted = match kind {
            RelationKind::Favorite => diesel::delete(
                favorites::table
                    .filter(favorites::user_id.eq(actor_id))
                    .filter(favorites::recipe_id.eq(target_id)),
            )
            .execute(&mut conn)?,
            RelationKind::ShoppingCart => diesel::delete(
                shopping_carts::table
                    .filter(shopping_carts::user_id.eq(actor_id))
                    .filter(shopping_carts::recipe_id.eq(target_id)),
            )
            .execute(&mut conn)?,
            RelationKind::Subscription => diesel::delete(
                subscriptions::table
                    .filter(subscriptions::user_id.eq(actor_id))
                    .filter(subscriptions::author_id.eq(target_id)),
            )
            .execute(&mut conn)?,
        };

        Ok(deleted > 0)
    }
}

/// Loads the subset of `target_ids` linked to `actor_id` in one `IN` query.
pub(crate) fn load_related_target_ids(
    conn: &mut SqliteConnection,
    kind: RelationKind,
    actor_id: i32,
    target_ids: &[i32],
) -> RepositoryResult<HashSet<i32>> {
    use crate::schema::{favorites, shopping_carts, subscriptions};

    if target_ids.is_empty() {
        return Ok(HashSet::new());
    }

    let ids = match kind {
        RelationKind::Favorite => favorites::table
            .filter(favorites::user_id.eq(actor_id))
            .filter(favorites::recipe_id.eq_any(target_ids))
            .select(favorites::recipe_id)
            .load::<i32>(conn)?,
        RelationKind::ShoppingCart => shopping_carts::table
            .filter(shopping_carts::user_id.eq(actor_id))
            .filter(shopping_carts::recipe_id.eq_any(target_ids))
            .select(shopping_carts::recipe_id)
            .load::<i32>(conn)?,
        RelationKind::Subscription => subscriptions::table
            .filter(subscriptions::user_id.eq(actor_id))
            .filter(subscriptions::author_id.eq_any(target_ids))
            .select(subscriptions::author_id)
            .load::<i32>(conn)?,
    };

    Ok(ids.into_iter().collect())
}
