mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use credit_card_application::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
