//! `PostgreSQL` adapter for tasks.

mod models;
mod repository;
mod schema;

pub use repository::PostgresTaskRepository;

#[cfg(test)]
mod tests;
