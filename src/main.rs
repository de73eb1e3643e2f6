use timesheet_autofill::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting timesheet autofill");

    // Load configuration
    let config = startup::load_config()?;

    // Serve the API
    startup::serve(config).await
}
