//! This module defines the `TuringMachine` struct, which runs a [`Machine`] over one input.
//! It owns everything that changes during a run: the tape, the cursor, the current state,
//! the step count and the execution history.

use crate::tape::Tape;
use crate::types::{Execution, Halt, HistoryEntry, Machine, Step, StepLimit, Symbol, Transition};

/// A single run of a machine over an input.
///
/// The machine description is borrowed and never modified, so several runs may share it.
pub struct TuringMachine<'m> {
    machine: &'m Machine,
    input: String,
    tape: Tape,
    cursor: isize,
    state: String,
    step_count: usize,
    history: Vec<HistoryEntry>,
    halted: Option<Halt>,
}

impl<'m> TuringMachine<'m> {
    /// Creates a new run with the head on the first input cell and the machine in its start state.
    ///
    /// # Arguments
    ///
    /// * `machine` - The machine to run.
    /// * `input` - Initial tape contents, one cell per character. May be empty.
    pub fn new(machine: &'m Machine, input: &str) -> Self {
        Self {
            machine,
            input: input.to_string(),
            tape: Tape::new(input, machine.blank()),
            cursor: 0,
            state: machine.start_state().to_string(),
            step_count: 0,
            history: Vec::new(),
            halted: None,
        }
    }

    /// Executes a single step.
    ///
    /// The tape is extended first if the head is just outside it. If no transition matches
    /// the current state and symbol the machine halts without recording anything. Otherwise
    /// the step is recorded, the transition applied, and the machine halts if it entered a
    /// final state. A halted machine keeps returning the same halt.
    ///
    /// The start state being final does not stop the first step: only entering a final
    /// state does.
    pub fn step(&mut self) -> Step {
        if let Some(halt) = &self.halted {
            return Step::Halt(halt.clone());
        }

        let position = self.align_cursor();
        let symbol = self.tape.get(position).unwrap_or(self.machine.blank());

        let machine = self.machine;
        let Some(transition) = machine.transition(&self.state, symbol) else {
            tracing::debug!(state = %self.state, ?symbol, position, "no transition");
            return self.halt(Halt::NoTransition {
                state: self.state.clone(),
                symbol,
            });
        };

        tracing::trace!(step = self.step_count, state = %self.state, ?symbol, position, "step");
        self.history.push(HistoryEntry {
            state: self.state.clone(),
            reading: symbol,
            position,
            memory: self.tape.to_string(),
            transition: transition.clone(),
        });

        self.apply(position, transition);
        self.step_count += 1;

        if machine.is_final(&self.state) {
            tracing::debug!(state = %self.state, steps = self.step_count, "final state reached");
            return self.halt(Halt::FinalState);
        }

        Step::Continue
    }

    /// Runs until the machine halts or `limit` is used up.
    ///
    /// # Returns
    ///
    /// * `Halt::FinalState` or `Halt::NoTransition` if the machine stopped by itself.
    /// * `Halt::StepLimit` if the budget ran out first.
    pub fn run(&mut self, limit: StepLimit) -> Halt {
        if let Some(halt) = &self.halted {
            return halt.clone();
        }

        while limit.allows(self.step_count) {
            if let Step::Halt(halt) = self.step() {
                return halt;
            }
        }

        tracing::debug!(steps = self.step_count, "step limit reached");
        Halt::StepLimit
    }

    /// Runs until the machine halts or `limit` is used up and returns the result.
    pub fn execute(mut self, limit: StepLimit) -> Execution {
        let halt = self.run(limit);

        Execution {
            output: self.tape.output(),
            accepted: self.is_accepting(),
            history: self.history,
            halt,
        }
    }

    /// Resets the run to its initial configuration: fresh tape from the input, head at 0,
    /// start state, no history.
    pub fn reset(&mut self) {
        *self = Self::new(self.machine, &self.input);
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the number of steps executed so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the head position. It may be `-1` or `tape().len()` between steps; the next
    /// step extends the tape to cover it.
    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn machine(&self) -> &'m Machine {
        self.machine
    }

    /// Returns why the machine halted, if it has.
    pub fn halted(&self) -> Option<&Halt> {
        self.halted.as_ref()
    }

    /// Checks whether the current state is final.
    pub fn is_accepting(&self) -> bool {
        self.machine.is_final(&self.state)
    }

    /// The current tape with leading and trailing blanks removed.
    pub fn output(&self) -> String {
        self.tape.output()
    }

    /// Makes sure the cursor points at a materialized cell and returns it as an index.
    ///
    /// The head moves at most one cell per step, so one extension is always enough.
    fn align_cursor(&mut self) -> usize {
        if self.cursor < 0 {
            self.tape.extend_left();
            self.cursor = 0;
        } else if self.cursor.unsigned_abs() >= self.tape.len() {
            self.tape.extend_right();
        }

        self.cursor.unsigned_abs()
    }

    fn apply(&mut self, position: usize, transition: &Transition) {
        match transition {
            Transition::Move(direction) => self.cursor += direction.offset(),
            Transition::Full {
                write,
                direction,
                next_state,
            } => {
                self.write(position, *write);
                self.cursor += direction.offset();
                self.state.clone_from(next_state);
            }
            Transition::Stall { write } => self.write(position, *write),
        }
    }

    fn write(&mut self, position: usize, symbol: Option<Symbol>) {
        if let Some(symbol) = symbol {
            self.tape.set(position, symbol);
        }
    }

    fn halt(&mut self, halt: Halt) -> Step {
        self.halted = Some(halt.clone());
        Step::Halt(halt)
    }
}

/// Runs `machine` on `input` until it accepts, rejects or uses up `limit`.
///
/// With [`StepLimit::Unbounded`] this never returns for a machine that does not halt.
#[tracing::instrument(level = "debug", skip_all, fields(start = %machine.start_state(), input_len = input.len()))]
pub fn run(machine: &Machine, input: &str, limit: StepLimit) -> Execution {
    let execution = TuringMachine::new(machine, input).execute(limit);
    tracing::debug!(
        steps = execution.steps(),
        accepted = execution.accepted,
        halt = ?execution.halt,
        "run finished"
    );
    execution
}
