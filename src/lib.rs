//! This crate simulates single-tape Turing machines.
//! It includes modules for describing machines, running them step by step while recording an
//! execution history, loading descriptions from JSON, checking them for common mistakes, and a
//! small collection of built-in machines.
//!
//! ```
//! use turingtoy::{run, Direction, Machine, StepLimit, Transition};
//!
//! let machine = Machine::new('_', "scan")
//!     .with_final_state("done")
//!     .with_transition("scan", 'a', Transition::right())
//!     .with_transition("scan", '_', Transition::full(Some('b'), Direction::Left, "done"));
//!
//! let (output, history, accepted) = run(&machine, "aa", StepLimit::Steps(100)).into_parts();
//! assert_eq!(output, "aab");
//! assert_eq!(history.len(), 3);
//! assert!(accepted);
//! ```

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `analyze` and `check_input` functions and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, check_input, AnalysisError};
/// Re-exports the `MachineLoader` struct from the loader module.
pub use loader::MachineLoader;
/// Re-exports the `TuringMachine` struct and the `run` entry point from the machine module.
pub use machine::{run, TuringMachine};
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the machine, transition and execution types from the types module.
pub use types::{
    Direction, Execution, Halt, HistoryEntry, Machine, MachineDescription, MachineError, Mode,
    Step, StepLimit, Symbol, Transition, DEFAULT_STEP_LIMIT,
};
