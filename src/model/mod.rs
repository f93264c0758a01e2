//! Domain model: the repository being browsed.

pub mod repository;
