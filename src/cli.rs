/// command-line entry: argument handling and the run report
pub mod cli_main;
/// task files describing one sensitivity run
pub mod task;
