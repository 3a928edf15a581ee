//! Ideas: early-stage proposals with collaborators, notes, resources and
//! links to the projects that may take them forward.
//!
//! Access is resolved the same way as for projects, but through
//! [`crate::access::IDEA_POLICY`], under which editors may also manage the
//! idea's collaborators.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
