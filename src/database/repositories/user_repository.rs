use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{NewUserRow, UserRow};
use crate::database::schema::users;
use crate::models::{NewUser, User};
use chrono::Utc;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::sync::Arc;

/// User repository trait - identity store keyed by email
pub trait UserRepository: Send + Sync {
    /// Find user by email
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Find the user owning an API key. Empty keys never match.
    fn find_by_api_key(&self, api_key: &str) -> Result<Option<User>, DatabaseError>;

    /// Insert a new user; `Conflict` if the email is taken
    fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError>;

    /// Replace (or clear, with `None`) the user's API key
    fn set_api_key(&self, email: &str, api_key: Option<String>)
        -> Result<Option<User>, DatabaseError>;
}

/// PostgreSQL implementation of UserRepository
pub struct UserRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl UserRepositoryImpl {
    /// Create new user repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

impl UserRepository for UserRepositoryImpl {
    fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()
            .map(|row| row.map(User::from))
            .map_err(DatabaseError::from)
    }

    fn find_by_api_key(&self, api_key: &str) -> Result<Option<User>, DatabaseError> {
        if api_key.is_empty() {
            return Ok(None);
        }

        let mut conn = (self.get_conn)()?;

        users::table
            .filter(users::api_key.eq(api_key))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .optional()
            .map(|row| row.map(User::from))
            .map_err(DatabaseError::from)
    }

    fn insert(&self, new_user: NewUser) -> Result<User, DatabaseError> {
        let mut conn = (self.get_conn)()?;
        let email = new_user.email.clone();

        diesel::insert_into(users::table)
            .values(NewUserRow::from(new_user))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .map(User::from)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    DatabaseError::Conflict(format!("User {} already exists", email))
                }
                other => DatabaseError::from(other),
            })
    }

    fn set_api_key(
        &self,
        email: &str,
        api_key: Option<String>,
    ) -> Result<Option<User>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        diesel::update(users::table)
            .filter(users::email.eq(email))
            .set((
                users::api_key.eq(api_key),
                users::updated_at.eq(Utc::now()),
            ))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .optional()
            .map(|row| row.map(User::from))
            .map_err(DatabaseError::from)
    }
}
