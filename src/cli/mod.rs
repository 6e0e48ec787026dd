//! DVC CLI integration
//! - options.rs: Executable, arguments and environment for an invocation
//! - version.rs: Compatibility gate for the installed CLI
//! - process.rs: Cancellable process execution
//! - reader.rs: Typed read-only commands
//! - contract.rs: JSON output types

pub mod constants;
pub mod contract;
pub mod error;
pub mod options;
pub mod process;
pub mod reader;
pub mod version;

pub use error::CliError;
pub use options::{CliOptions, command_string, get_options};
pub use reader::DvcReader;
pub use version::{CliCompatible, VersionNotifier, extract_semver, is_version_compatible};
