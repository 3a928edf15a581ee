//! `PostgreSQL` adapter for ideas.

mod models;
mod repository;
mod schema;

pub use repository::PostgresIdeaRepository;

#[cfg(test)]
mod tests;
