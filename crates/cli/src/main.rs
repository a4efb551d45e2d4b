use std::process::ExitCode;

fn main() -> ExitCode {
    mealtable_cli::run()
}
