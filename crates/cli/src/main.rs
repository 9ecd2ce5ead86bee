use std::process::ExitCode;

fn main() -> ExitCode {
    farmlink_cli::run()
}
