use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Tolerance for binary floating point noise when scaling to tenths.
const TENTHS_EPSILON: f64 = 1e-6;

/// Quantity of an ingredient with one fractional digit, stored as tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    /// Smallest quantity a recipe may use.
    pub const MIN: Amount = Amount(1);

    pub fn from_tenths(tenths: i64) -> Self {
        Self(tenths)
    }

    pub fn tenths(self) -> i64 {
        self.0
    }

    /// Converts a decimal value with at most one fractional digit. Returns
    /// `None` for finer precision, non-finite values or values that do not fit
    /// the storage column.
    pub fn from_decimal(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let scaled = value * 10.0;
        let tenths = scaled.round();
        if (scaled - tenths).abs() > TENTHS_EPSILON || tenths.abs() > i32::MAX as f64 {
            return None;
        }
        Some(Self(tenths as i64))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        Amount(self.0 + rhs.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Amount::default(), Add::add)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let whole = self.0.abs() / 10;
        let fraction = self.0.abs() % 10;
        if fraction == 0 {
            write!(f, "{sign}{whole}")
        } else {
            write!(f, "{sign}{whole}.{fraction}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.0 % 10 == 0 {
            serializer.serialize_i64(self.0 / 10)
        } else {
            serializer.serialize_f64(self.0 as f64 / 10.0)
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Amount::from_decimal(value)
            .ok_or_else(|| de::Error::custom(format!("invalid ingredient amount `{value}`")))
    }
}

/// Ingredient row of a recipe, expanded with the ingredient's reference data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeIngredient {
    /// Identifier of the referenced ingredient.
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
    pub amount: Amount,
}

/// Ingredient reference with quantity supplied when writing a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewRecipeIngredient {
    pub ingredient_id: i32,
    pub amount: Amount,
}

impl NewRecipeIngredient {
    pub fn new(ingredient_id: i32, amount: Amount) -> Self {
        Self {
            ingredient_id,
            amount,
        }
    }
}
