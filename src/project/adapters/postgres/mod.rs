//! `PostgreSQL` adapter for projects and topics.

mod models;
mod repository;
mod schema;
mod topics;

pub use repository::PostgresProjectRepository;

#[cfg(test)]
mod tests;
