pub mod cli;
pub mod completion;
pub mod config;
pub mod log;
pub mod lsp;
pub mod parser;
pub mod repository;
pub mod webview;
