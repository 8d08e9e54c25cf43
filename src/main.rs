use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pushrelay=info")),
        )
        .init();

    match cli::run() {
        cli::RunOutcome::Serve(config) => {
            if let Err(err) = pushrelay::serve(config).await {
                tracing::error!(error = %err, "pushrelay stopped");
                std::process::exit(1);
            }
        }
        cli::RunOutcome::Exit(code) => std::process::exit(code),
    }
}
