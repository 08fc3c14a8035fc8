use std::collections::HashMap;

use serde::Serialize;

use crate::domain::recipe_ingredient::Amount;

/// Name of the attachment offered for download.
pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.txt";

/// One ingredient row of a recipe that sits in the viewer's shopping cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListRow {
    pub ingredient_id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: Amount,
}

/// Summed quantity of one ingredient across the whole cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingListItem {
    pub name: String,
    pub measurement_unit: String,
    pub total: Amount,
}

/// Groups rows by ingredient name and unit and sums their amounts.
///
/// Items are ordered by descending total. Equal totals keep the order in which
/// their group was first seen in `rows`.
pub fn aggregate(rows: impl IntoIterator<Item = ShoppingListRow>) -> Vec<ShoppingListItem> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut items: Vec<ShoppingListItem> = Vec::new();

    for row in rows {
        let key = (row.name, row.measurement_unit);
        match index.get(&key) {
            Some(&position) => {
                items[position].total = items[position].total + row.amount;
            }
            None => {
                index.insert(key.clone(), items.len());
                items.push(ShoppingListItem {
                    name: key.0,
                    measurement_unit: key.1,
                    total: row.amount,
                });
            }
        }
    }

    // stable sort keeps first-seen order for ties
    items.sort_by(|a, b| b.total.cmp(&a.total));
    items
}

/// Renders one `"<name> - <total> <unit>"` line per item.
pub fn render(items: &[ShoppingListItem]) -> String {
    items
        .iter()
        .map(|item| format!("{} - {} {}", item.name, item.total, item.measurement_unit))
        .collect::<Vec<_>>()
        .join("\n")
}
