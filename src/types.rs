//! This module defines the core data structures used throughout the simulator: the machine
//! description and its validated form, transitions, step limits, execution history and the
//! error type shared by every module.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use thiserror::Error;

/// A single tape symbol.
pub type Symbol = char;

/// The default number of steps the command-line frontend allows before giving up.
pub const DEFAULT_STEP_LIMIT: usize = 10_000;

/// Represents the possible directions the head can move.
///
/// Serialized as `"L"` and `"R"`, which is also the shorthand form of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left.
    #[serde(rename = "L")]
    Left,
    /// Move the head one cell to the right.
    #[serde(rename = "R")]
    Right,
}

impl Direction {
    /// The signed cursor offset for this direction.
    pub fn offset(self) -> isize {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// A transition rule, applied when the machine reads a given symbol in a given state.
///
/// The shape is fixed when the machine is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "RawTransition")]
pub enum Transition {
    /// Shorthand move: shift the head without writing or changing state.
    Move(Direction),
    /// Optionally write a symbol, then move and enter `next_state`.
    Full {
        write: Option<Symbol>,
        direction: Direction,
        next_state: String,
    },
    /// A mapping that names no direction. Writes if asked, then leaves the head and the state
    /// where they are. Only produced when loading in [`Mode::Normal`].
    Stall { write: Option<Symbol> },
}

impl Transition {
    /// Shorthand move to the left.
    pub fn left() -> Self {
        Transition::Move(Direction::Left)
    }

    /// Shorthand move to the right.
    pub fn right() -> Self {
        Transition::Move(Direction::Right)
    }

    /// A full transition that writes `write` (if any), moves, and enters `next_state`.
    pub fn full(write: Option<Symbol>, direction: Direction, next_state: impl Into<String>) -> Self {
        Transition::Full {
            write,
            direction,
            next_state: next_state.into(),
        }
    }

    /// The state this transition enters, if it changes state at all.
    pub fn next_state(&self) -> Option<&str> {
        match self {
            Transition::Full { next_state, .. } => Some(next_state),
            _ => None,
        }
    }

    /// Converts a raw transition from a machine description.
    ///
    /// In [`Mode::Strict`] a mapping must name exactly one of `L` and `R`. In [`Mode::Normal`]
    /// `R` takes precedence when both are present and a mapping with neither becomes
    /// [`Transition::Stall`].
    fn from_raw(raw: RawTransition, mode: Mode) -> Result<Self, String> {
        let action = match raw {
            RawTransition::Move(direction) => return Ok(Transition::Move(direction)),
            RawTransition::Full(action) => action,
        };

        let write = action
            .write
            .as_deref()
            .map(single_symbol)
            .transpose()
            .map_err(|e| e.to_string())?;

        match (action.left, action.right, mode) {
            (Some(_), Some(_), Mode::Strict) => {
                Err("both `L` and `R` are given; exactly one is allowed".to_string())
            }
            (None, None, Mode::Strict) => {
                Err("neither `L` nor `R` is given; exactly one is required".to_string())
            }
            (_, Some(next_state), _) => Ok(Transition::full(write, Direction::Right, next_state)),
            (Some(next_state), None, _) => Ok(Transition::full(write, Direction::Left, next_state)),
            (None, None, Mode::Normal) => Ok(Transition::Stall { write }),
        }
    }
}

/// The external form of a transition: either `"L"` / `"R"` or a mapping with an optional
/// `write` and a next state under `L` or `R`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTransition {
    Move(Direction),
    Full(RawAction),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write: Option<String>,
    #[serde(rename = "L", default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    #[serde(rename = "R", default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
}

impl From<Transition> for RawTransition {
    fn from(transition: Transition) -> Self {
        match transition {
            Transition::Move(direction) => RawTransition::Move(direction),
            Transition::Full {
                write,
                direction,
                next_state,
            } => {
                let (left, right) = match direction {
                    Direction::Left => (Some(next_state), None),
                    Direction::Right => (None, Some(next_state)),
                };
                RawTransition::Full(RawAction {
                    write: write.map(String::from),
                    left,
                    right,
                })
            }
            Transition::Stall { write } => RawTransition::Full(RawAction {
                write: write.map(String::from),
                ..RawAction::default()
            }),
        }
    }
}

/// How strictly a machine description is checked when it is loaded.
///
/// Neither mode changes how a well-formed machine runs:
/// - `Normal` (default): a transition mapping without a direction is kept as a no-op
///   [`Transition::Stall`], and `R` wins when both directions are named.
/// - `Strict`: such mappings are rejected with [`MachineError::MalformedTransition`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Normal,
    Strict,
}

/// The external machine description, exactly as a caller writes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineDescription {
    pub blank: String,
    #[serde(rename = "start state")]
    pub start_state: String,
    #[serde(rename = "final states")]
    pub final_states: Vec<String>,
    /// State -> symbol -> transition. A state mapped to `null` has no transitions.
    pub table: BTreeMap<String, Option<BTreeMap<String, RawTransition>>>,
}

/// A validated, immutable Turing machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    blank: Symbol,
    start_state: String,
    final_states: HashSet<String>,
    table: HashMap<String, HashMap<Symbol, Transition>>,
}

impl Machine {
    /// Creates a machine with no final states and an empty table.
    pub fn new(blank: Symbol, start_state: impl Into<String>) -> Self {
        Self {
            blank,
            start_state: start_state.into(),
            final_states: HashSet::new(),
            table: HashMap::new(),
        }
    }

    /// Adds an accepting state.
    pub fn with_final_state(mut self, state: impl Into<String>) -> Self {
        self.final_states.insert(state.into());
        self
    }

    /// Adds (or replaces) the transition taken when `state` reads `symbol`.
    pub fn with_transition(
        mut self,
        state: impl Into<String>,
        symbol: Symbol,
        transition: Transition,
    ) -> Self {
        self.table
            .entry(state.into())
            .or_default()
            .insert(symbol, transition);
        self
    }

    /// Validates a description and converts it into a machine.
    ///
    /// # Returns
    ///
    /// * `Err(MachineError::InvalidSymbol)` if the blank or a table symbol is not a single character.
    /// * `Err(MachineError::MalformedTransition)` if a transition is rejected under `mode`.
    pub fn from_description(
        description: MachineDescription,
        mode: Mode,
    ) -> Result<Self, MachineError> {
        let blank = single_symbol(&description.blank)?;
        let mut table = HashMap::with_capacity(description.table.len());

        for (state, transitions) in description.table {
            let mut row = HashMap::new();
            for (symbol, raw) in transitions.unwrap_or_default() {
                let symbol = single_symbol(&symbol)?;
                let transition = Transition::from_raw(raw, mode).map_err(|reason| {
                    MachineError::MalformedTransition {
                        state: state.clone(),
                        symbol,
                        reason,
                    }
                })?;
                row.insert(symbol, transition);
            }
            table.insert(state, row);
        }

        Ok(Self {
            blank,
            start_state: description.start_state,
            final_states: description.final_states.into_iter().collect(),
            table,
        })
    }

    pub fn blank(&self) -> Symbol {
        self.blank
    }

    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    pub fn final_states(&self) -> &HashSet<String> {
        &self.final_states
    }

    pub fn table(&self) -> &HashMap<String, HashMap<Symbol, Transition>> {
        &self.table
    }

    /// Checks whether `state` is accepting.
    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.contains(state)
    }

    /// Looks up the transition for reading `symbol` in `state`.
    ///
    /// `None` means the machine halts: either the state has no row or the row has no entry
    /// for the symbol.
    pub fn transition(&self, state: &str, symbol: Symbol) -> Option<&Transition> {
        self.table.get(state)?.get(&symbol)
    }

    /// Total number of transitions across all states.
    pub fn transition_count(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }
}

impl TryFrom<MachineDescription> for Machine {
    type Error = MachineError;

    fn try_from(description: MachineDescription) -> Result<Self, Self::Error> {
        Machine::from_description(description, Mode::Normal)
    }
}

impl From<&Machine> for MachineDescription {
    fn from(machine: &Machine) -> Self {
        let mut final_states: Vec<String> = machine.final_states.iter().cloned().collect();
        final_states.sort();

        let table = machine
            .table
            .iter()
            .map(|(state, row)| {
                let row: BTreeMap<String, RawTransition> = row
                    .iter()
                    .map(|(symbol, t)| (symbol.to_string(), RawTransition::from(t.clone())))
                    .collect();
                (state.clone(), Some(row))
            })
            .collect();

        Self {
            blank: machine.blank.to_string(),
            start_state: machine.start_state.clone(),
            final_states,
            table,
        }
    }
}

/// How many steps a run may take.
///
/// There is no default: running without a budget risks never returning on a machine that
/// does not halt, so the caller has to ask for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepLimit {
    Unbounded,
    Steps(usize),
}

impl StepLimit {
    /// Whether another step may run after `step_count` steps.
    pub fn allows(self, step_count: usize) -> bool {
        match self {
            StepLimit::Unbounded => true,
            StepLimit::Steps(max) => step_count < max,
        }
    }
}

/// One executed step, recorded before the transition is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// The state the machine was in before the step.
    pub state: String,
    /// The symbol under the head.
    pub reading: Symbol,
    /// Head position after any tape extension, before the move.
    pub position: usize,
    /// The whole tape at the time of the read.
    pub memory: String,
    pub transition: Transition,
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a step and may continue.
    Continue,
    /// The machine has halted.
    Halt(Halt),
}

/// Why a machine stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Halt {
    /// A step entered a final state.
    FinalState,
    /// No transition is defined for the state and the symbol under the head.
    NoTransition { state: String, symbol: Symbol },
    /// The step budget ran out.
    StepLimit,
}

/// The result of running a machine on an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    /// Final tape contents with leading and trailing blanks removed.
    pub output: String,
    pub history: Vec<HistoryEntry>,
    /// Whether the machine stopped in a final state, whatever made it stop.
    pub accepted: bool,
    pub halt: Halt,
}

impl Execution {
    /// Number of steps executed.
    pub fn steps(&self) -> usize {
        self.history.len()
    }

    /// Splits the execution into `(output, history, accepted)`.
    pub fn into_parts(self) -> (String, Vec<HistoryEntry>, bool) {
        (self.output, self.history, self.accepted)
    }
}

/// Represents the errors that can occur while loading, checking or running machines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    /// The description is missing a required field or has the wrong shape.
    #[error("Malformed machine description: {0}")]
    Description(String),
    /// A blank, table or write symbol is not exactly one character.
    #[error("Invalid symbol {0:?}: symbols must be exactly one character")]
    InvalidSymbol(String),
    /// A transition was rejected at load time.
    #[error("Malformed transition for state {state} on symbol {symbol:?}: {reason}")]
    MalformedTransition {
        state: String,
        symbol: Symbol,
        reason: String,
    },
    /// A static check found a problem with an otherwise well-formed machine.
    #[error("Machine validation error: {0}")]
    ValidationError(String),
    /// Reading machine files failed.
    #[error("File error: {0}")]
    FileError(String),
}

impl From<serde_json::Error> for MachineError {
    fn from(error: serde_json::Error) -> Self {
        MachineError::Description(error.to_string())
    }
}

/// Parses a string that must hold exactly one symbol.
pub(crate) fn single_symbol(text: &str) -> Result<Symbol, MachineError> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(MachineError::InvalidSymbol(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn description(table: serde_json::Value) -> MachineDescription {
        serde_json::from_value(json!({
            "blank": "_",
            "start state": "q0",
            "final states": ["qf"],
            "table": table,
        }))
        .unwrap()
    }

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "\"L\"");
        assert_eq!(serde_json::to_string(&Direction::Right).unwrap(), "\"R\"");

        let right: Direction = serde_json::from_str("\"R\"").unwrap();
        assert_eq!(right, Direction::Right);
    }

    #[test]
    fn test_transition_shapes() {
        let machine = Machine::try_from(description(json!({
            "q0": {
                "a": "R",
                "b": "L",
                "c": {"write": "x", "L": "qf"},
                "d": {"R": "q1"},
            }
        })))
        .unwrap();

        assert_eq!(machine.transition("q0", 'a'), Some(&Transition::right()));
        assert_eq!(machine.transition("q0", 'b'), Some(&Transition::left()));
        assert_eq!(
            machine.transition("q0", 'c'),
            Some(&Transition::full(Some('x'), Direction::Left, "qf"))
        );
        assert_eq!(
            machine.transition("q0", 'd'),
            Some(&Transition::full(None, Direction::Right, "q1"))
        );
        assert_eq!(machine.transition("q0", 'z'), None);
        assert_eq!(machine.transition("q9", 'a'), None);
    }

    #[test]
    fn test_missing_direction_by_mode() {
        let table = json!({"q0": {"a": {"write": "b"}}});

        let machine = Machine::from_description(description(table.clone()), Mode::Normal).unwrap();
        assert_eq!(
            machine.transition("q0", 'a'),
            Some(&Transition::Stall { write: Some('b') })
        );

        let error = Machine::from_description(description(table), Mode::Strict).unwrap_err();
        assert!(matches!(
            error,
            MachineError::MalformedTransition { ref state, symbol: 'a', .. } if state == "q0"
        ));
    }

    #[test]
    fn test_both_directions_by_mode() {
        let table = json!({"q0": {"a": {"L": "left", "R": "right"}}});

        let machine = Machine::from_description(description(table.clone()), Mode::Normal).unwrap();
        assert_eq!(machine.transition("q0", 'a').and_then(Transition::next_state), Some("right"));

        assert!(Machine::from_description(description(table), Mode::Strict).is_err());
    }

    #[test]
    fn test_invalid_symbols() {
        let mut desc = description(json!({}));
        desc.blank = "__".to_string();
        assert_eq!(
            Machine::try_from(desc).unwrap_err(),
            MachineError::InvalidSymbol("__".to_string())
        );

        let desc = description(json!({"q0": {"ab": "R"}}));
        assert!(matches!(
            Machine::try_from(desc),
            Err(MachineError::InvalidSymbol(_))
        ));

        let desc = description(json!({"q0": {"a": {"write": "", "R": "q0"}}}));
        assert!(matches!(
            Machine::try_from(desc),
            Err(MachineError::MalformedTransition { .. })
        ));
    }

    #[test]
    fn test_null_state_row() {
        let machine = Machine::try_from(description(json!({"q0": null}))).unwrap();
        assert!(machine.table().contains_key("q0"));
        assert_eq!(machine.transition("q0", '_'), None);
    }

    #[test]
    fn test_missing_field_is_description_error() {
        let result: Result<MachineDescription, _> = serde_json::from_value(json!({
            "blank": "_",
            "final states": [],
            "table": {},
        }));
        let error = MachineError::from(result.unwrap_err());

        assert!(matches!(error, MachineError::Description(_)));
        assert!(error.to_string().contains("start state"));
    }

    #[test]
    fn test_transition_serializes_to_description_shape() {
        let full = Transition::full(Some('1'), Direction::Left, "qf");
        assert_eq!(
            serde_json::to_value(&full).unwrap(),
            json!({"write": "1", "L": "qf"})
        );
        assert_eq!(serde_json::to_value(Transition::right()).unwrap(), json!("R"));
        assert_eq!(
            serde_json::to_value(Transition::Stall { write: None }).unwrap(),
            json!({})
        );
    }

    #[test]
    fn test_description_round_trip() {
        let desc = description(json!({
            "q0": {"0": {"write": "1", "L": "qf"}, "1": "R"},
        }));
        let machine = Machine::try_from(desc.clone()).unwrap();

        assert_eq!(MachineDescription::from(&machine), desc);
    }

    #[test]
    fn test_step_limit() {
        assert!(StepLimit::Unbounded.allows(usize::MAX));
        assert!(StepLimit::Steps(2).allows(1));
        assert!(!StepLimit::Steps(2).allows(2));
        assert!(!StepLimit::Steps(0).allows(0));
    }

    #[test]
    fn test_error_display() {
        let error = MachineError::MalformedTransition {
            state: "q0".to_string(),
            symbol: 'a',
            reason: "no direction".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("q0"));
        assert!(message.contains("'a'"));
    }
}
