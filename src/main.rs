//! checkout-blocks binary entrypoint kept minimal. The preview runtime lives in `app`.

use clap::Parser;

use checkout_blocks::app::{self, Args, determine_log_level, logging};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let args = Args::parse();
    logging::init(&determine_log_level(&args), args.log_file.as_deref());

    tracing::info!("checkout-blocks starting");
    let code = match app::run(args).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Application error");
            eprintln!("error: {err}");
            std::process::ExitCode::FAILURE
        }
    };
    tracing::info!("checkout-blocks exited");
    code
}
