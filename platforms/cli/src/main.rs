use clap::Parser;
use std::error::Error;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use turingtoy::{
    analyze, check_input, Execution, Machine, MachineLoader, Mode, ProgramManager, StepLimit,
    TuringMachine, DEFAULT_STEP_LIMIT,
};

/// Runs a single-tape Turing machine described in JSON.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  turingtoy-cli --machine increment.json --input 1011
  turingtoy-cli --builtin busy-beaver-2 --trace
  cat increment.json | turingtoy-cli --input 0111 --json")]
struct Cli {
    /// Path to a machine description (.json). Read from stdin when omitted and piped.
    #[clap(short, long, conflicts_with = "builtin")]
    machine: Option<PathBuf>,

    /// Name of a built-in machine (see --list)
    #[clap(short, long)]
    builtin: Option<String>,

    /// Initial tape contents. Defaults to the sample input of a built-in machine.
    #[clap(short, long)]
    input: Option<String>,

    /// Maximum number of steps to execute
    #[clap(long, default_value_t = DEFAULT_STEP_LIMIT, conflicts_with = "unbounded")]
    max_steps: usize,

    /// Run without a step limit. Never returns for a machine that does not halt.
    #[clap(long)]
    unbounded: bool,

    /// Reject transitions that name no direction, or both, instead of tolerating them
    #[clap(long)]
    strict: bool,

    /// Check the machine and input for common mistakes before running
    #[clap(long)]
    check: bool,

    /// Print each step of the execution
    #[clap(short = 'd', long)]
    trace: bool,

    /// Print the whole execution as JSON
    #[clap(long, conflicts_with = "trace")]
    json: bool,

    /// List the built-in machines and exit
    #[clap(long)]
    list: bool,
}

impl Cli {
    fn step_limit(&self) -> StepLimit {
        if self.unbounded {
            StepLimit::Unbounded
        } else {
            StepLimit::Steps(self.max_steps)
        }
    }

    fn mode(&self) -> Mode {
        if self.strict {
            Mode::Strict
        } else {
            Mode::Normal
        }
    }

    /// Resolves the machine and the input to run it on.
    fn load(&self) -> Result<(Machine, String), Box<dyn Error>> {
        if let Some(name) = &self.builtin {
            let program = ProgramManager::get_program_by_name(name)?;
            let input = self.input.clone().unwrap_or(program.sample_input);
            return Ok((program.machine, input));
        }

        let machine = match &self.machine {
            Some(path) => MachineLoader::load_machine(path, self.mode())?,
            None if atty::isnt(atty::Stream::Stdin) => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                MachineLoader::load_machine_from_str(&content, self.mode())?
            }
            None => {
                return Err("no machine given: use --machine, --builtin or pipe JSON on stdin".into())
            }
        };

        Ok((machine, self.input.clone().unwrap_or_default()))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .init();
}

fn list_programs() {
    for index in 0..ProgramManager::get_program_count() {
        if let Ok(info) = ProgramManager::get_program_info(index) {
            println!(
                "{:<20} start: {:<8} finals: {:?}  states: {}  transitions: {}  sample: {:?}",
                info.name,
                info.start_state,
                info.final_states,
                info.state_count,
                info.transition_count,
                info.sample_input
            );
        }
    }
}

fn print_trace(execution: &Execution) {
    for (step, entry) in execution.history.iter().enumerate() {
        println!(
            "Step: {}, State: {}, Reading: {:?}, Position: {}, Tape: [{}]",
            step, entry.state, entry.reading, entry.position, entry.memory
        );
    }
    println!("\nHalted: {:?}\n", execution.halt);
}

fn run(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let (machine, input) = cli.load()?;

    if cli.check {
        analyze(&machine)?;
        check_input(&machine, &input)?;
    }

    let execution = TuringMachine::new(&machine, &input).execute(cli.step_limit());

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&execution)?);
    } else {
        if cli.trace {
            print_trace(&execution);
        }
        println!("{}", execution.output);
        eprintln!(
            "{} after {} steps",
            if execution.accepted { "accepted" } else { "rejected" },
            execution.steps()
        );
    }

    Ok(execution.accepted)
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    if cli.list {
        list_programs();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
