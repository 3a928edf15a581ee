//! `PostgreSQL` repository implementation for user accounts.

use super::{models::UserRow, schema::users};
use crate::account::{
    domain::{EmailAddress, PersistedUserData, User, UserId, UserProfile},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use crate::storage::{PgPool, run_blocking};
use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn store(&self, user: &User) -> UserRepositoryResult<()> {
        let row = to_row(user);
        let email = user.email().clone();
        run_blocking(&self.pool, UserRepositoryError::persistence, move |connection| {
            diesel::insert_into(users::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &email))?;
            Ok(())
        })
        .await
    }

    async fn update(&self, user: &User) -> UserRepositoryResult<()> {
        let row = to_row(user);
        let email = user.email().clone();
        let id = user.id();
        run_blocking(&self.pool, UserRepositoryError::persistence, move |connection| {
            let affected = diesel::update(users::table.filter(users::id.eq(row.id)))
                .set(&row)
                .execute(connection)
                .map_err(|err| map_write_error(err, &email))?;
            if affected == 0 {
                return Err(UserRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: UserId) -> UserRepositoryResult<Option<User>> {
        run_blocking(&self.pool, UserRepositoryError::persistence, move |connection| {
            let row = users::table
                .filter(users::id.eq(id.into_inner()))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_by_email(&self, email: &EmailAddress) -> UserRepositoryResult<Option<User>> {
        let lookup = email.as_str().to_owned();
        run_blocking(&self.pool, UserRepositoryError::persistence, move |connection| {
            let row = users::table
                .filter(users::email.eq(lookup))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }

    async fn find_many(&self, ids: &[UserId]) -> UserRepositoryResult<Vec<User>> {
        let keys: Vec<uuid::Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        run_blocking(&self.pool, UserRepositoryError::persistence, move |connection| {
            users::table
                .filter(users::id.eq_any(keys))
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?
                .into_iter()
                .map(row_to_user)
                .collect()
        })
        .await
    }

    async fn search(
        &self,
        query: &str,
        exclude: UserId,
        limit: usize,
    ) -> UserRepositoryResult<Vec<User>> {
        let pattern = format!("%{}%", escape_like(query.trim()));
        let limit = i64::try_from(limit).map_err(UserRepositoryError::persistence)?;
        run_blocking(&self.pool, UserRepositoryError::persistence, move |connection| {
            users::table
                .filter(users::id.ne(exclude.into_inner()))
                .filter(
                    users::first_name
                        .ilike(pattern.clone())
                        .or(users::last_name.ilike(pattern.clone()))
                        .or(users::email.ilike(pattern)),
                )
                .order(users::email.asc())
                .limit(limit)
                .select(UserRow::as_select())
                .load::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?
                .into_iter()
                .map(row_to_user)
                .collect()
        })
        .await
    }
}

fn map_write_error(err: DieselError, email: &EmailAddress) -> UserRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserRepositoryError::DuplicateEmail(email.clone())
        }
        other => UserRepositoryError::persistence(other),
    }
}

/// Escapes `LIKE` wildcards so user input matches literally.
pub(crate) fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub(super) fn to_row(user: &User) -> UserRow {
    let profile = user.profile();
    UserRow {
        id: user.id().into_inner(),
        email: user.email().as_str().to_owned(),
        first_name: user.first_name().to_owned(),
        last_name: user.last_name().to_owned(),
        password_hash: user.password_hash().to_owned(),
        is_active: user.is_active(),
        bio: profile.bio.clone(),
        phone: profile.phone.clone(),
        company: profile.company.clone(),
        job_title: profile.job_title.clone(),
        location: profile.location.clone(),
        last_login: user.last_login(),
        date_joined: user.date_joined(),
        updated_at: user.updated_at(),
    }
}

pub(super) fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let UserRow {
        id,
        email: persisted_email,
        first_name,
        last_name,
        password_hash,
        is_active,
        bio,
        phone,
        company,
        job_title,
        location,
        last_login,
        date_joined,
        updated_at,
    } = row;
    let email = EmailAddress::new(persisted_email).map_err(UserRepositoryError::persistence)?;
    Ok(User::from_persisted(PersistedUserData {
        id: UserId::from_uuid(id),
        email,
        first_name,
        last_name,
        password_hash,
        is_active,
        profile: UserProfile {
            bio,
            phone,
            company,
            job_title,
            location,
        },
        last_login,
        date_joined,
        updated_at,
    }))
}
