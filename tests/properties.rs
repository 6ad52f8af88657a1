//! Property-based tests for the interpreter.
//!
//! Machines are generated over a small alphabet and state set so that random tables
//! produce a healthy mix of accepting, rejecting and non-halting runs.

use proptest::prelude::*;
use turingtoy::{run, Direction, Halt, Machine, StepLimit, Transition};

const STATES: [&str; 4] = ["q0", "q1", "q2", "qf"];
const SYMBOLS: [char; 3] = ['a', 'b', '_'];

fn arbitrary_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Left), Just(Direction::Right)]
}

fn arbitrary_transition() -> impl Strategy<Value = Transition> {
    prop_oneof![
        arbitrary_direction().prop_map(Transition::Move),
        (
            proptest::option::of(0..SYMBOLS.len()),
            arbitrary_direction(),
            0..STATES.len()
        )
            .prop_map(|(write, direction, next)| {
                Transition::full(write.map(|i| SYMBOLS[i]), direction, STATES[next])
            }),
    ]
}

prop_compose! {
    fn arbitrary_machine()(
        rules in proptest::collection::vec(
            (0..3usize, 0..SYMBOLS.len(), arbitrary_transition()),
            0..9,
        ),
        accept_start in any::<bool>(),
    ) -> Machine {
        let mut machine = Machine::new('_', "q0").with_final_state("qf");
        if accept_start {
            machine = machine.with_final_state("q0");
        }
        rules.into_iter().fold(machine, |machine, (state, symbol, transition)| {
            machine.with_transition(STATES[state], SYMBOLS[symbol], transition)
        })
    }
}

fn arbitrary_input() -> impl Strategy<Value = String> {
    proptest::collection::vec(prop_oneof![Just('a'), Just('b'), Just('_')], 0..8)
        .prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn output_has_no_outer_blanks(
        machine in arbitrary_machine(),
        input in arbitrary_input(),
        max in 0..40usize,
    ) {
        let execution = run(&machine, &input, StepLimit::Steps(max));
        prop_assert!(!execution.output.starts_with('_'));
        prop_assert!(!execution.output.ends_with('_'));
        prop_assert_eq!(execution.output.trim_matches('_'), execution.output.as_str());
    }

    #[test]
    fn history_never_exceeds_budget(
        machine in arbitrary_machine(),
        input in arbitrary_input(),
        max in 0..40usize,
    ) {
        let execution = run(&machine, &input, StepLimit::Steps(max));
        prop_assert!(execution.history.len() <= max);

        match execution.halt {
            Halt::StepLimit => prop_assert_eq!(execution.history.len(), max),
            Halt::FinalState => prop_assert!(execution.accepted),
            Halt::NoTransition { .. } => prop_assert!(execution.history.len() < max),
        }
    }

    #[test]
    fn runs_are_deterministic(
        machine in arbitrary_machine(),
        input in arbitrary_input(),
        max in 0..40usize,
    ) {
        let first = run(&machine, &input, StepLimit::Steps(max));
        let second = run(&machine, &input, StepLimit::Steps(max));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn positions_index_the_recorded_tape(
        machine in arbitrary_machine(),
        input in arbitrary_input(),
        max in 0..40usize,
    ) {
        let execution = run(&machine, &input, StepLimit::Steps(max));
        for entry in &execution.history {
            let memory: Vec<char> = entry.memory.chars().collect();
            prop_assert!(entry.position < memory.len());
            prop_assert_eq!(memory[entry.position], entry.reading);
        }
    }

    #[test]
    fn accepted_matches_last_state(
        machine in arbitrary_machine(),
        input in arbitrary_input(),
        max in 1..40usize,
    ) {
        let execution = run(&machine, &input, StepLimit::Steps(max));
        let last_state = match (&execution.halt, execution.history.last()) {
            (_, None) => machine.start_state().to_string(),
            (Halt::NoTransition { state, .. }, Some(_)) => state.clone(),
            (_, Some(entry)) => entry
                .transition
                .next_state()
                .unwrap_or(entry.state.as_str())
                .to_string(),
        };
        prop_assert_eq!(execution.accepted, machine.is_final(&last_state));
    }

    #[test]
    fn larger_budget_extends_history(
        machine in arbitrary_machine(),
        input in arbitrary_input(),
        max in 0..30usize,
    ) {
        let short = run(&machine, &input, StepLimit::Steps(max));
        let long = run(&machine, &input, StepLimit::Steps(max + 10));
        prop_assert!(long.history.starts_with(&short.history));
        if short.halt != Halt::StepLimit {
            prop_assert_eq!(short, long);
        }
    }
}
