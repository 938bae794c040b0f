use std::process::ExitCode;
use uplift_stats::AnalysisError;

fn main() -> ExitCode {
    match uplift_cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AnalysisError>() {
                Some(AnalysisError::InvalidConfig(_)) | None => eprintln!("Error: {:#}", err),
                Some(input_err) => eprintln!(
                    "An error occurred, please check the test data input and try again: {}",
                    input_err
                ),
            }
            ExitCode::FAILURE
        }
    }
}
