//! Errors raised while composing a deployment.

use thiserror::Error;

use crate::addons::AddOnKind;

/// Errors that can occur while building the configuration, the add-on list,
/// the capacity descriptor or the deployment unit.
#[derive(Error, Debug)]
pub enum BlueprintError {
    /// A required environment variable is not set.
    #[error("Environment variable {0} is not set")]
    MissingEnv(&'static str),

    /// The account identifier is not a 12-digit AWS account id.
    #[error("Invalid AWS account id: {0:?} (expected 12 digits)")]
    InvalidAccount(String),

    /// The region is not a well-formed AWS region id.
    #[error("Invalid AWS region: {0:?}")]
    InvalidRegion(String),

    /// Unknown environment profile name.
    #[error("Unknown profile: {0}. Supported: dev, prod")]
    UnknownProfile(String),

    /// The same add-on appears more than once.
    #[error("Add-on {0} is listed more than once")]
    DuplicateAddOn(AddOnKind),

    /// An add-on requires a capability that is not listed at all.
    #[error("Add-on {add_on} requires {requires}, which is not enabled")]
    MissingDependency {
        add_on: AddOnKind,
        requires: AddOnKind,
    },

    /// An add-on is listed before a capability it requires.
    #[error("Add-on {add_on} must be listed after {requires}")]
    OrderingViolation {
        add_on: AddOnKind,
        requires: AddOnKind,
    },

    /// Two mutually exclusive add-ons are both enabled.
    #[error("Add-on {add_on} conflicts with {conflicts_with}")]
    Conflict {
        add_on: AddOnKind,
        conflicts_with: AddOnKind,
    },

    /// A terminal add-on (GitOps bootstrapper) is not the last entry.
    #[error("Add-on {0} must be the last add-on in the list")]
    TerminalNotLast(AddOnKind),

    /// Dependencies between add-ons form a cycle.
    #[error("Dependency cycle between add-ons: {}", format_kinds(.0))]
    DependencyCycle(Vec<AddOnKind>),

    /// Both capacity strategies were supplied.
    #[error("Only one capacity strategy may be selected (managed pool or self-managed group)")]
    CapacityConflict,

    /// No capacity strategy was supplied.
    #[error("A capacity strategy is required (managed pool or self-managed group)")]
    NoCapacity,

    /// The selected capacity strategy is malformed.
    #[error("Invalid capacity descriptor: {0}")]
    InvalidCapacity(String),

    /// A builder was finalized without a required field.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}

fn format_kinds(kinds: &[AddOnKind]) -> String {
    kinds
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Result alias for composition operations.
pub type Result<T> = std::result::Result<T, BlueprintError>;
