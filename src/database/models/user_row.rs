use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::models::{NewUser, User};

/// User entity as stored in the `users` table
#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = crate::database::schema::users)]
#[diesel(primary_key(id))]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub api_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            api_key: row.api_key,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// New user row for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::database::schema::users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
        }
    }
}
