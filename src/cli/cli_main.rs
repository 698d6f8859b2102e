use super::task::{CliError, SensitivityTask};
use crate::Solvers::SolverFactory;
use crate::Utils::logger::init_logger;
use crate::settings::SensitivityConfig;

pub const USAGE: &str = "SensiThe <task.json> [config.json]";

/// `args` without the program name
pub fn run_cli(args: &[String]) -> Result<(), CliError> {
    let (task_path, config_path) = match args {
        [task] => (task.as_str(), None),
        [task, config] => (task.as_str(), Some(config.as_str())),
        _ => return Err(CliError::Usage(USAGE.to_string())),
    };
    let config = match config_path {
        Some(path) => SensitivityConfig::load(path)?,
        None => SensitivityConfig::default(),
    };
    let task = SensitivityTask::load(task_path)?;
    let log_file = task.log_file.as_ref().map(|f| task.resolve(f));
    init_logger(config.log_level(), log_file.as_deref())?;

    let mut solvers = SolverFactory::from_executables(config.executables.iter());
    let outcome = task.run(&mut solvers, &config)?;
    println!(
        "\x1b[34m\n SensiThe: sensitivity run ({}) finished \n\x1b[0m",
        task.method
    );
    outcome.pretty_print();
    if !outcome.all_optimal() {
        println!("\x1b[33mnot every solve reached an optimal point, see the table above\x1b[0m");
    }
    Ok(())
}
