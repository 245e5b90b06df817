use std::io::Write;

use chrono::{DateTime, Utc};
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::pg::{Pg, PgValue};
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::{Identifiable, Insertable, Queryable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    FromSqlRow, AsExpression, PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize, ToSchema,
)]
#[diesel(sql_type = crate::db::schema::sql_types::UserRole)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Manager,
    Courier,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Client => "client",
            UserRole::Manager => "manager",
            UserRole::Courier => "courier",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client" => Some(UserRole::Client),
            "manager" => Some(UserRole::Manager),
            "courier" => Some(UserRole::Courier),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl ToSql<crate::db::schema::sql_types::UserRole, Pg> for UserRole {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Pg>) -> serialize::Result {
        out.write_all(self.as_str().as_bytes())?;
        Ok(IsNull::No)
    }
}

impl FromSql<crate::db::schema::sql_types::UserRole, Pg> for UserRole {
    fn from_sql(bytes: PgValue<'_>) -> deserialize::Result<Self> {
        match bytes.as_bytes() {
            b"client" => Ok(UserRole::Client),
            b"manager" => Ok(UserRole::Manager),
            b"courier" => Ok(UserRole::Courier),
            b"admin" => Ok(UserRole::Admin),
            _ => Err("Unrecognized enum variant".into()),
        }
    }
}

#[derive(Queryable, Identifiable, Debug, Clone, Serialize)]
#[diesel(table_name = crate::db::schema::users)]
#[diesel(primary_key(user_id))]
pub struct User {
    pub user_id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::db::schema::users)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: UserRole,
}
