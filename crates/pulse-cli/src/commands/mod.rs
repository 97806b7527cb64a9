//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config loading)
//! - `analyze` - Payload analysis and result formatting
//! - `ai_check` - AI provider configuration check
//! - `serve` - Web server command

pub mod ai_check;
pub mod analyze;
pub mod core;
pub mod serve;

// Re-export command functions for main.rs
pub use ai_check::*;
pub use analyze::*;
pub use core::*;
pub use serve::*;
