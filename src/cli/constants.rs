//! DVC command vocabulary

pub const DVC_EXECUTABLE: &str = "dvc";

/// Top-level dvc commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Add,
    Checkout,
    Commit,
    Data,
    Experiment,
    List,
    Pull,
    Push,
    Remove,
    Status,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Checkout => "checkout",
            Self::Commit => "commit",
            Self::Data => "data",
            Self::Experiment => "exp",
            Self::List => "list",
            Self::Pull => "pull",
            Self::Push => "push",
            Self::Remove => "remove",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubCommand {
    Show,
    Status,
}

impl SubCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Show => "show",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    DvcOnly,
    Force,
    Granular,
    Json,
    Recursive,
    Unchanged,
    Version,
}

impl Flag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DvcOnly => "--dvc-only",
            Self::Force => "-f",
            Self::Granular => "--granular",
            Self::Json => "--json",
            Self::Recursive => "-R",
            Self::Unchanged => "--unchanged",
            Self::Version => "--version",
        }
    }
}

/// Target for commands that operate on the current directory.
pub const CURRENT_DIRECTORY: &str = ".";
