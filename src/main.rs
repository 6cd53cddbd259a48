use std::process::ExitCode;

use repodash::ui::output;

fn main() -> ExitCode {
    match repodash::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
