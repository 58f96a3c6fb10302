use migration::Migrator;
use sea_orm_migration::cli;

/// `DATABASE_URL` selects the target database; see `migration --help`
#[tokio::main]
async fn main() {
    core_config::tracing::install_color_eyre();
    cli::run_cli(Migrator).await;
}
