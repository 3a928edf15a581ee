//! Planboard: collaborative planning of projects, ideas and tasks.
//!
//! Users own projects and ideas, share them with members under a role,
//! and break the work down into tasks, task lists and topics. Every
//! read and write is checked by a single role-based access engine.
//!
//! # Architecture
//!
//! Each bounded context follows hexagonal architecture principles:
//!
//! - **Domain**: value types and aggregates with no infrastructure
//!   dependencies
//! - **Ports**: async traits for persistence and blob storage
//! - **Adapters**: in-memory and `PostgreSQL` implementations of the ports
//! - **Services**: orchestration with access checks
//!
//! # Modules
//!
//! - [`access`]: roles, permissions and the access policies
//! - [`account`]: users, password hashing and bearer tokens
//! - [`project`]: projects, members, files, links, activity and topics
//! - [`idea`]: ideas with their notes, resources and members
//! - [`task`]: tasks, task lists, templates and task records
//! - [`blob`]: storage for uploaded bytes
//! - [`api`]: the axum HTTP surface
//! - [`app`], [`config`] and [`telemetry`]: process start-up

pub mod access;
pub mod account;
pub mod api;
pub mod app;
pub mod blob;
pub mod config;
pub mod idea;
pub mod project;
pub mod shared;
pub mod storage;
pub mod task;
pub mod telemetry;
