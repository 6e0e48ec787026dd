//! DVC CLI version gate

use std::cell::RefCell;
use std::sync::LazyLock;

use regex::Regex;
use semver::Version;

/// A `major.minor.patch` triple read from `dvc --version` output.
pub type ParsedSemver = Version;

pub const MIN_CLI_VERSION: ParsedSemver = Version::new(2, 9, 4);
pub const LATEST_TESTED_CLI_VERSION: ParsedSemver = Version::new(2, 11, 1);
/// First major version that is no longer supported.
pub const MAX_CLI_VERSION: u64 = 3;

static SEMVER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)").expect("valid semver regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCompatible {
    Yes,
    NoCannotVerify,
    NoIncompatible,
    NoNotFound,
}

impl CliCompatible {
    pub fn is_compatible(self) -> bool {
        self == Self::Yes
    }
}

/// Receives user-facing warnings raised while checking a version.
#[cfg_attr(test, mockall::automock)]
pub trait VersionNotifier {
    fn warn(&self, message: &str);
}

/// Notifier that keeps the warnings for later delivery.
#[derive(Debug, Default)]
pub struct CollectedWarnings {
    messages: RefCell<Vec<String>>,
}

impl CollectedWarnings {
    pub fn into_messages(self) -> Vec<String> {
        self.messages.into_inner()
    }
}

impl VersionNotifier for CollectedWarnings {
    fn warn(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

/// Reads the leading `major.minor.patch` of a version string.
///
/// Anything after the patch number (`.dev11+gab024a47`, `rc1`, ...) is ignored.
pub fn extract_semver(version: &str) -> Option<ParsedSemver> {
    let captures = SEMVER_PREFIX.captures(version.trim())?;
    let part = |index: usize| captures.get(index)?.as_str().parse::<u64>().ok();

    Some(Version::new(part(1)?, part(2)?, part(3)?))
}

pub fn is_version_compatible(
    version: Option<&str>,
    notifier: &dyn VersionNotifier,
) -> CliCompatible {
    let Some(version) = version else {
        return CliCompatible::NoNotFound;
    };

    let Some(current) = extract_semver(version) else {
        notifier.warn(&format!(
            "Unable to verify the DVC CLI version from `{}`. Language features that need the CLI are disabled.",
            version.trim()
        ));
        return CliCompatible::NoCannotVerify;
    };

    if current.major >= MAX_CLI_VERSION {
        notifier.warn(&incompatible_message(&current, "extension"));
        return CliCompatible::NoIncompatible;
    }

    if current < MIN_CLI_VERSION {
        notifier.warn(&incompatible_message(&current, "CLI"));
        return CliCompatible::NoIncompatible;
    }

    if is_ahead_of_latest_tested(&current) {
        notifier.warn(&format!(
            "The located DVC CLI ({}) is at least a minor version ahead of the latest version tested ({}). This could lead to unexpected behaviour.",
            current, LATEST_TESTED_CLI_VERSION
        ));
    }

    CliCompatible::Yes
}

fn is_ahead_of_latest_tested(current: &ParsedSemver) -> bool {
    current.major == LATEST_TESTED_CLI_VERSION.major
        && current.minor > LATEST_TESTED_CLI_VERSION.minor
}

fn incompatible_message(current: &ParsedSemver, upgrade: &str) -> String {
    format!(
        "You are using version {} of the DVC CLI. The expected version is {} <= DVC < {}. Please upgrade to the most recent version of the {} and reload this window.",
        current, MIN_CLI_VERSION, MAX_CLI_VERSION, upgrade
    )
}
