pub mod collection;
pub mod config;
pub mod db;
pub mod map;
pub mod models;
pub mod session;
pub mod sync;
