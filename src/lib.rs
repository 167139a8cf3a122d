// Core infrastructure modules
pub mod config;
pub mod core;

// Feature-specific modules
pub mod credentials;
pub mod pager;
pub mod query_editor;
pub mod repl;
pub mod results_grid;
pub mod session;
pub mod sql_completer;

#[cfg(test)]
mod test_utils;
