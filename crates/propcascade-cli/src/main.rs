use std::process::ExitCode;

fn main() -> ExitCode {
    propcascade_cli::run()
}
