//! This module provides static checks for machines. None of them change how a machine runs:
//! a machine that fails a check still runs with exactly the same semantics. They catch the
//! usual authoring mistakes, such as a misspelled state name, before a long run does.

use crate::types::{Machine, MachineError, Symbol};
use std::collections::{BTreeSet, HashSet, VecDeque};

/// Represents the problems that can be found during the analysis of a machine.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The start state has no transitions and is not final, so every run rejects at once.
    InvalidStartState(String),
    /// Final states that no transition enters and that are not the start state.
    UnreachableFinalStates(Vec<String>),
    /// Transitions enter states that have no transitions and are not final.
    UndefinedNextStates(Vec<String>),
    /// States with transitions that cannot be reached from the start state.
    UnreachableStates(Vec<String>),
    /// The input contains symbols that no transition reads.
    UnhandledInputSymbols(Vec<Symbol>),
}

impl From<AnalysisError> for MachineError {
    /// Converts an `AnalysisError` into a `MachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        let message = match error {
            AnalysisError::InvalidStartState(state) => format!("Invalid start state: {state}"),
            AnalysisError::UnreachableFinalStates(states) => {
                format!("Final states never entered by any transition: {states:?}")
            }
            AnalysisError::UndefinedNextStates(states) => {
                format!("Transitions reference undefined states: {states:?}")
            }
            AnalysisError::UnreachableStates(states) => {
                format!("Unreachable states detected: {states:?}")
            }
            AnalysisError::UnhandledInputSymbols(symbols) => {
                format!("Input contains symbols not handled by any transition: {symbols:?}")
            }
        };

        MachineError::ValidationError(message)
    }
}

/// Analyzes a machine for structural mistakes.
///
/// # Returns
///
/// * `Ok(())` if no problems are found.
/// * `Err(MachineError::ValidationError)` describing the first problem found.
pub fn analyze(machine: &Machine) -> Result<(), MachineError> {
    [
        check_start_state,
        check_final_states,
        check_undefined_next_states,
        check_unreachable_states,
    ]
    .iter()
    .find_map(|check| check(machine).err())
    .map_or(Ok(()), |error| Err(error.into()))
}

/// Checks that every non-blank symbol of `input` is read by at least one transition.
pub fn check_input(machine: &Machine, input: &str) -> Result<(), MachineError> {
    let handled: HashSet<Symbol> = machine
        .table()
        .values()
        .flat_map(|row| row.keys().copied())
        .collect();

    let unhandled: BTreeSet<Symbol> = input
        .chars()
        .filter(|c| *c != machine.blank() && !handled.contains(c))
        .collect();

    if unhandled.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UnhandledInputSymbols(unhandled.into_iter().collect()).into())
    }
}

/// Every state entered by some transition.
fn next_states(machine: &Machine) -> BTreeSet<&str> {
    machine
        .table()
        .values()
        .flat_map(|row| row.values().filter_map(|t| t.next_state()))
        .collect()
}

fn check_start_state(machine: &Machine) -> Result<(), AnalysisError> {
    let start = machine.start_state();
    if machine.table().contains_key(start) || machine.is_final(start) {
        Ok(())
    } else {
        Err(AnalysisError::InvalidStartState(start.to_string()))
    }
}

fn check_final_states(machine: &Machine) -> Result<(), AnalysisError> {
    let entered = next_states(machine);
    let unreachable: BTreeSet<&String> = machine
        .final_states()
        .iter()
        .filter(|state| *state != machine.start_state() && !entered.contains(state.as_str()))
        .collect();

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UnreachableFinalStates(
            unreachable.into_iter().cloned().collect(),
        ))
    }
}

fn check_undefined_next_states(machine: &Machine) -> Result<(), AnalysisError> {
    let undefined: Vec<String> = next_states(machine)
        .into_iter()
        .filter(|state| !machine.table().contains_key(*state) && !machine.is_final(state))
        .map(String::from)
        .collect();

    if undefined.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UndefinedNextStates(undefined))
    }
}

/// Walks the table breadth-first from the start state.
fn check_unreachable_states(machine: &Machine) -> Result<(), AnalysisError> {
    let mut reachable = HashSet::new();
    let mut queue = VecDeque::from([machine.start_state()]);

    while let Some(state) = queue.pop_front() {
        if !reachable.insert(state) {
            continue;
        }
        if let Some(row) = machine.table().get(state) {
            queue.extend(row.values().filter_map(|t| t.next_state()));
        }
    }

    let unreachable: BTreeSet<&str> = machine
        .table()
        .keys()
        .map(String::as_str)
        .filter(|state| !reachable.contains(state))
        .collect();

    if unreachable.is_empty() {
        Ok(())
    } else {
        Err(AnalysisError::UnreachableStates(
            unreachable.into_iter().map(String::from).collect(),
        ))
    }
}
