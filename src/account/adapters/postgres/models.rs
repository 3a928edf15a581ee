//! Diesel row models for user accounts.

use super::schema::users;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result and insert/update model for user records.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct UserRow {
    /// User identifier.
    pub id: uuid::Uuid,
    /// Normalised email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Password hash.
    pub password_hash: String,
    /// Whether sign-in is allowed.
    pub is_active: bool,
    /// Biography.
    pub bio: String,
    /// Phone number.
    pub phone: String,
    /// Company.
    pub company: String,
    /// Job title.
    pub job_title: String,
    /// Location.
    pub location: String,
    /// Last sign-in.
    pub last_login: Option<DateTime<Utc>>,
    /// Registration timestamp.
    pub date_joined: DateTime<Utc>,
    /// Last change timestamp.
    pub updated_at: DateTime<Utc>,
}
