//! Input handling
//!
//! Key tokens, the action vocabulary, the key binding registry and the
//! resolution buffer that turns typed keys into actions.

pub mod actions;
pub mod buffer;
pub mod handler;
pub mod key;
pub mod keybindings;
