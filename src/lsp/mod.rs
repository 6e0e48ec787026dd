// LSP protocol layer
// - server.rs: stdio server entry point
// - backend.rs: LanguageServer trait implementation
// - workspace.rs: Open documents and on-disk lookups next to dvc.yaml
// - definition.rs: Go-to-definition for dvc.yaml symbols

pub mod backend;
pub mod definition;
pub mod server;
pub mod workspace;
