pub mod commands;
pub mod help;
pub mod navigation;
pub mod popups;
pub mod remap;
pub mod search;
pub mod tabs;
