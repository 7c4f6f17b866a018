use std::process::ExitCode;

fn main() -> ExitCode {
    renoquote_cli::run()
}
