use std::process::ExitCode;

fn main() -> ExitCode {
    match sov_spreads::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Failures before the logger is up (bad log dir) still need to reach the user.
            if log::max_level() == log::LevelFilter::Off {
                eprintln!("{err}");
            } else {
                log::error!("{err}");
            }
            ExitCode::from(err.exit_code())
        }
    }
}
