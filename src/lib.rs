pub mod agenda;
pub mod cli;
pub mod config;
pub mod error;
pub mod forge;
pub mod publisher;
pub mod repo;

pub use error::{AgendaError, Result, Step};
pub use publisher::AgendaPublisher;

#[cfg(test)]
pub mod test_helpers;
