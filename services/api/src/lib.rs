mod cli;
mod infra;
mod report;
mod routes;
mod server;

use sekolah_okupasi::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
