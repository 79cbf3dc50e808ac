use std::sync::Arc;

use agenda_api::{ApiState, config::ApiConfig};
use agenda_client::{HttpAgendaSource, SourceConfig};
use agenda_engine::{Agenda, ScheduleLoader};
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;
    let source_config = SourceConfig::from_env()?;
    agenda_api::init_tracing(config.log_level)?;

    // Connect to the scheduling backend
    let timeout = source_config.fetch_timeout;
    info!(
        "Loading meeting {} from {}",
        source_config.meeting, source_config.base_url
    );
    let source = HttpAgendaSource::new(source_config)?;
    let loader = Arc::new(ScheduleLoader::new(Arc::new(source), timeout));

    // Bulk load the schedule and compute initial conflicts
    let agenda = Agenda::new().shared();
    let summary = loader.load_schedule(&agenda).await?;
    info!(
        "Initial conflicts computed at revision {} ({} groups, {} people fetched)",
        summary.revision, summary.groups, summary.people
    );

    // Start API server
    let state = Arc::new(ApiState { agenda, loader });
    agenda_api::start_server(config, state).await?;

    Ok(())
}
