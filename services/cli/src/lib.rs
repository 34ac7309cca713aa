mod cli;
mod commands;
mod io;

use nutri_score::error::AppError;

pub fn run() -> Result<(), AppError> {
    cli::run()
}
