use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::user::{NewUser as DomainNewUser, User as DomainUser, UserListQuery},
    models::user::{NewUser as DbNewUser, User as DbUser},
    repository::{DieselRepository, UserReader, UserWriter},
};

impl UserReader for DieselRepository {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<DomainUser>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::id.eq(id))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(Into::into))
    }

    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<DomainUser>> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let user = users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .first::<DbUser>(&mut conn)
            .optional()?;

        Ok(user.map(Into::into))
    }

    fn get_users_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<DomainUser>> {
        use crate::schema::users;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let users = users::table
            .filter(users::id.eq_any(ids))
            .order(users::id.asc())
            .load::<DbUser>(&mut conn)?;

        Ok(users.into_iter().map(Into::into).collect())
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<DomainUser>)> {
        use crate::schema::{subscriptions, users};

        let mut conn = self.conn()?;

        let mut count_query = users::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(subscriber) = query.subscribed_by {
            count_query = count_query.filter(
                users::id.eq_any(
                    subscriptions::table
                        .filter(subscriptions::user_id.eq(subscriber))
                        .select(subscriptions::author_id),
                ),
            );
        }

        let total = count_query.count().get_result::<i64>(&mut conn)? as usize;

        let mut items = users::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(subscriber) = query.subscribed_by {
            items = items.filter(
                users::id.eq_any(
                    subscriptions::table
                        .filter(subscriptions::user_id.eq(subscriber))
                        .select(subscriptions::author_id),
                ),
            );
        }

        items = items.order(users::id.asc());

        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            let limit = pagination.per_page as i64;
            items = items.offset(offset).limit(limit);
        }

        let db_users = items.load::<DbUser>(&mut conn)?;

        Ok((total, db_users.into_iter().map(Into::into).collect()))
    }
}

impl UserWriter for DieselRepository {
    fn create_user(&self, new_user: &DomainNewUser) -> RepositoryResult<DomainUser> {
        use crate::schema::users;

        let mut conn = self.conn()?;
        let db_new = DbNewUser::from(new_user);

        let created = diesel::insert_into(users::table)
            .values(&db_new)
            .get_result::<DbUser>(&mut conn)?;

        Ok(created.into())
    }
}
