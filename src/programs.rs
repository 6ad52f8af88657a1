use crate::loader::MachineLoader;
use crate::types::{Machine, MachineError, Mode};

// Built-in machines: (name, sample input, description)
const PROGRAM_TEXTS: [(&str, &str, &str); 3] = [
    (
        "binary-increment",
        "1011",
        include_str!("../machines/binary-increment.json"),
    ),
    ("even-length", "aaaa", include_str!("../machines/even-length.json")),
    ("busy-beaver-2", "", include_str!("../machines/busy-beaver-2.json")),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = ProgramManager::load();
}

/// A built-in machine together with an input that shows what it does.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub sample_input: String,
    pub machine: Machine,
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded machine descriptions. Descriptions that fail to load are skipped.
    fn load() -> Vec<Program> {
        PROGRAM_TEXTS
            .iter()
            .filter_map(|(name, sample_input, text)| {
                match MachineLoader::load_machine_from_str(text, Mode::Strict) {
                    Ok(machine) => Some(Program {
                        name: name.to_string(),
                        sample_input: sample_input.to_string(),
                        machine,
                    }),
                    Err(e) => {
                        tracing::error!(program = *name, error = %e, "failed to load built-in program");
                        None
                    }
                }
            })
            .collect()
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, MachineError> {
        PROGRAMS.get(index).cloned().ok_or_else(|| {
            MachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, MachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| MachineError::ValidationError(format!("Program '{}' not found", name)))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let program = Self::get_program_by_index(index)?;
        let machine = &program.machine;

        let mut final_states: Vec<String> = machine.final_states().iter().cloned().collect();
        final_states.sort();

        Ok(ProgramInfo {
            index,
            name: program.name.clone(),
            start_state: machine.start_state().to_string(),
            sample_input: program.sample_input.clone(),
            final_states,
            state_count: machine.table().len(),
            transition_count: machine.transition_count(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub start_state: String,
    pub sample_input: String,
    pub final_states: Vec<String>,
    pub state_count: usize,
    pub transition_count: usize,
}
