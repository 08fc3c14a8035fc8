use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct NewSubscription {
    /// Subscriber.
    pub user_id: i32,
    /// Followed author.
    pub author_id: i32,
}
