use std::fmt;

/// Kind of user-owned relation handled by the add/remove toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    /// User marked a recipe as favourite.
    Favorite,
    /// User put a recipe into the shopping cart.
    ShoppingCart,
    /// User follows another user's recipes.
    Subscription,
}

impl RelationKind {
    /// Message returned when adding a relation that already exists.
    pub fn already_present_message(self) -> &'static str {
        match self {
            RelationKind::Favorite => "recipe is already in favorites",
            RelationKind::ShoppingCart => "recipe is already in the shopping cart",
            RelationKind::Subscription => "already subscribed to this author",
        }
    }

    /// Message returned when removing a relation that does not exist.
    pub fn not_present_message(self) -> &'static str {
        match self {
            RelationKind::Favorite => "recipe is not in favorites",
            RelationKind::ShoppingCart => "recipe is not in the shopping cart",
            RelationKind::Subscription => "not subscribed to this author",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationKind::Favorite => "favorite",
            RelationKind::ShoppingCart => "shopping cart",
            RelationKind::Subscription => "subscription",
        };
        f.write_str(name)
    }
}
