use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match pipeline_leaderboard::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (message, code) = pipeline_leaderboard::report(&err);
            tracing::error!(error = %format!("{err:#}"), "command_failed");
            eprintln!("error: {message}");
            ExitCode::from(code)
        }
    }
}
