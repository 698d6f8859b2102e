use SensiThe::cli::cli_main::run_cli;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run_cli(&args) {
        eprintln!("\x1b[31m{}\x1b[0m", e);
        std::process::exit(1);
    }
}
