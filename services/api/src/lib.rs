mod cli;
mod console;
mod infra;
mod routes;
mod server;

use provider_risk::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
