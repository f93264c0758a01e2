pub mod async_bridge;
pub mod search;
pub mod terminal_modes;
pub mod tracing_setup;
