mod cli;
mod demo;
mod infra;
mod routes;
mod samples;
mod server;

use pix_triage::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
