//! Dependency ordering for add-on lists.
//!
//! The provisioning engine applies add-ons in list order, so a capability has
//! to be listed before anything that needs it. [`validate`] checks a declared
//! order against the catalog; [`resolve`] computes one.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::addons::{AddOn, AddOnKind};
use crate::error::{BlueprintError, Result};

/// How the deployment-unit builder treats the declared add-on order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderingMode {
    /// Reject any list whose order violates a dependency.
    #[default]
    Strict,
    /// Reorder the list into a valid dependency order.
    Resolve,
}

impl OrderingMode {
    /// Apply this mode to `add_ons`.
    ///
    /// # Errors
    /// Returns the first ordering, dependency or conflict violation found.
    pub fn apply(self, add_ons: Vec<AddOn>) -> Result<Vec<AddOn>> {
        match self {
            Self::Strict => {
                validate(&add_ons)?;
                Ok(add_ons)
            }
            Self::Resolve => resolve(add_ons),
        }
    }
}

/// Check that every add-on appears after the capabilities it requires, that
/// nothing is listed twice or alongside a conflicting add-on, and that a
/// terminal add-on is last.
///
/// # Errors
/// Returns the first violation in list order.
pub fn validate(add_ons: &[AddOn]) -> Result<()> {
    let positions = index_kinds(add_ons)?;
    check_conflicts(add_ons, &positions)?;

    for (index, add_on) in add_ons.iter().enumerate() {
        let kind = add_on.kind();
        for &dep in kind.requires() {
            match positions.get(&dep) {
                None => {
                    return Err(BlueprintError::MissingDependency {
                        add_on: kind,
                        requires: dep,
                    })
                }
                Some(&position) if position > index => {
                    return Err(BlueprintError::OrderingViolation {
                        add_on: kind,
                        requires: dep,
                    })
                }
                Some(_) => {}
            }
        }
        if kind.is_terminal() && index + 1 != add_ons.len() {
            return Err(BlueprintError::TerminalNotLast(kind));
        }
    }

    Ok(())
}

/// Order `add_ons` so that every dependency precedes its dependents.
///
/// The result is deterministic: among add-ons whose dependencies are met, the
/// one declared first goes first, so an already valid list is returned
/// unchanged. Terminal add-ons are placed last.
///
/// # Errors
/// Returns an error for duplicates, conflicts, missing dependencies, a
/// dependency on a terminal add-on, or a dependency cycle.
pub fn resolve(add_ons: Vec<AddOn>) -> Result<Vec<AddOn>> {
    let positions = index_kinds(&add_ons)?;
    check_conflicts(&add_ons, &positions)?;

    let (terminal, regular): (Vec<_>, Vec<_>) =
        add_ons.into_iter().partition(|a| a.kind().is_terminal());

    let regular_positions: HashMap<AddOnKind, usize> = regular
        .iter()
        .enumerate()
        .map(|(i, a)| (a.kind(), i))
        .collect();

    // dependents[i] lists the add-ons waiting on i
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); regular.len()];
    let mut pending: Vec<usize> = vec![0; regular.len()];

    for (index, add_on) in regular.iter().enumerate() {
        let kind = add_on.kind();
        for &dep in kind.requires() {
            if dep.is_terminal() && positions.contains_key(&dep) {
                return Err(BlueprintError::TerminalNotLast(dep));
            }
            let Some(&dep_index) = regular_positions.get(&dep) else {
                return Err(BlueprintError::MissingDependency {
                    add_on: kind,
                    requires: dep,
                });
            };
            dependents[dep_index].push(index);
            pending[index] += 1;
        }
    }

    let mut ready: BTreeSet<usize> = pending
        .iter()
        .enumerate()
        .filter(|(_, count)| **count == 0)
        .map(|(i, _)| i)
        .collect();
    let mut order = Vec::with_capacity(regular.len());

    while let Some(index) = ready.pop_first() {
        order.push(index);
        for &next in &dependents[index] {
            pending[next] -= 1;
            if pending[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() != regular.len() {
        let cycle = pending
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(i, _)| regular[i].kind())
            .collect();
        return Err(BlueprintError::DependencyCycle(cycle));
    }

    let mut slots: Vec<Option<AddOn>> = regular.into_iter().map(Some).collect();
    let mut resolved: Vec<AddOn> = order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect();
    resolved.extend(terminal);

    debug!(
        add_ons = resolved.len(),
        order = %resolved.iter().map(|a| a.kind().name()).collect::<Vec<_>>().join(","),
        "Resolved add-on order"
    );

    Ok(resolved)
}

fn index_kinds(add_ons: &[AddOn]) -> Result<HashMap<AddOnKind, usize>> {
    let mut positions = HashMap::with_capacity(add_ons.len());
    for (index, add_on) in add_ons.iter().enumerate() {
        if positions.insert(add_on.kind(), index).is_some() {
            return Err(BlueprintError::DuplicateAddOn(add_on.kind()));
        }
    }
    Ok(positions)
}

fn check_conflicts(add_ons: &[AddOn], positions: &HashMap<AddOnKind, usize>) -> Result<()> {
    for add_on in add_ons {
        let kind = add_on.kind();
        if let Some(&other) = kind
            .conflicts_with()
            .iter()
            .find(|other| positions.contains_key(*other))
        {
            return Err(BlueprintError::Conflict {
                add_on: kind,
                conflicts_with: other,
            });
        }
    }
    Ok(())
}
