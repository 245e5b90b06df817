use std::io::Write;

use bigdecimal::BigDecimal;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::user::UserRole;

/// Catalog lifecycle state. One tagged state instead of separate
/// availability and soft-delete flags, so `deleted + available` is not
/// representable.
#[derive(
    FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = crate::db::schema::sql_types::ItemState)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    Active,
    Unavailable,
    Deleted,
}

impl ToSql<crate::db::schema::sql_types::ItemState, Pg> for ItemState {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        match *self {
            ItemState::Active => out.write_all(b"active")?,
            ItemState::Unavailable => out.write_all(b"unavailable")?,
            ItemState::Deleted => out.write_all(b"deleted")?,
        }
        Ok(IsNull::No)
    }
}

impl FromSql<crate::db::schema::sql_types::ItemState, Pg> for ItemState {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"active" => Ok(ItemState::Active),
            b"unavailable" => Ok(ItemState::Unavailable),
            b"deleted" => Ok(ItemState::Deleted),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

/// How much of the catalog a listing shows, derived from the caller's role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CatalogVisibility {
    /// Non-staff callers: active items only.
    ActiveOnly,
    /// Staff default: everything not soft-deleted.
    NotDeleted,
    /// Staff asking for the whole catalog, deleted items included.
    All,
}

impl CatalogVisibility {
    /// Only managers and admins may see past the active catalog; the
    /// `include_deleted` flag is ignored for everyone else.
    pub fn for_role(role: UserRole, include_deleted: bool) -> Self {
        match role {
            UserRole::Manager | UserRole::Admin if include_deleted => CatalogVisibility::All,
            UserRole::Manager | UserRole::Admin => CatalogVisibility::NotDeleted,
            _ => CatalogVisibility::ActiveOnly,
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::db::schema::pizzas)]
#[diesel(primary_key(pizza_id))]
pub struct Pizza {
    pub pizza_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub image_link: Option<String>,
    pub state: ItemState,
}

#[derive(Insertable, Debug, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::pizzas)]
pub struct NewPizza {
    pub name: String,
    pub description: Option<String>,
    pub image_link: Option<String>,
    pub state: ItemState,
}

#[derive(AsChangeset, Debug, Clone, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::pizzas)]
pub struct UpdatePizza {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_link: Option<String>,
    pub state: Option<ItemState>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::db::schema::ingredients)]
#[diesel(primary_key(ingredient_id))]
pub struct Ingredient {
    pub ingredient_id: i32,
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price_per_gram: BigDecimal,
    pub weight_small: i32,
    pub weight_medium: i32,
    pub weight_big: i32,
    pub state: ItemState,
}

#[derive(Insertable, Debug, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::ingredients)]
pub struct NewIngredient {
    pub name: String,
    pub description: Option<String>,
    #[schema(value_type = String)]
    pub price_per_gram: BigDecimal,
    pub weight_small: i32,
    pub weight_medium: i32,
    pub weight_big: i32,
    pub state: ItemState,
}

#[derive(AsChangeset, Debug, Clone, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::ingredients)]
pub struct UpdateIngredient {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price_per_gram: Option<BigDecimal>,
    pub weight_small: Option<i32>,
    pub weight_medium: Option<i32>,
    pub weight_big: Option<i32>,
    pub state: Option<ItemState>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, ToSchema)]
#[diesel(table_name = crate::db::schema::pizza_sizes)]
#[diesel(primary_key(size_id))]
pub struct PizzaSize {
    pub size_id: i32,
    pub name: String,
    #[schema(value_type = String)]
    pub base_price: BigDecimal,
    pub base_weight: i32,
}

#[derive(Insertable, Debug, Deserialize, ToSchema)]
#[diesel(table_name = crate::db::schema::pizza_sizes)]
pub struct NewPizzaSize {
    pub name: String,
    #[schema(value_type = String)]
    pub base_price: BigDecimal,
    pub base_weight: i32,
}
