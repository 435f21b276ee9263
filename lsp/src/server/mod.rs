mod analysis;
mod cli;
mod config;
mod entry;
mod handlers;
mod state;
mod symbols;
mod text;

pub use analysis::diagnostics_for_text;
pub use entry::run;
pub use symbols::document_symbol_tree;
