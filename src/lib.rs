pub mod config;
pub mod db;
pub mod observability;

pub use db::{create_read_pool, create_write_pool};
