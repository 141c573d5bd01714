//! Tool registry and handlers for the brew assistant.
//!
//! The LLM requests work through named function calls; this crate owns the
//! fixed tool set. Argument JSON is parsed into a [`ToolRequest`] at the
//! boundary (one variant per tool), the [`ToolRegistry`] maps each request
//! to its handler, and every handler failure is folded into a structured
//! error payload so a single bad tool call can never take down the
//! conversation loop.
//!
//! The recipe engine (LLM recipe generation and bounded structured
//! extraction) also lives here, since both the `provide_recipe` /
//! `save_recipe` tools and the dashboard's one-off generation use it.

mod definitions;
mod handlers;
pub mod prompts;
mod recipe;
mod registry;
mod request;
mod response;

pub use definitions::definitions;
pub use recipe::{GeneratedRecipe, MAX_EXTRACT_ATTEMPTS, RecipeEngine, RecipeError, SettingAlignment};
pub use registry::{ToolRegistry, ToolState};
pub use request::{ToolParseError, ToolRequest};
pub use response::{ToolResponse, UNRECOGNIZED_TOOL_MESSAGE};
