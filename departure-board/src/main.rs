use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use departure_board::board::{BoardController, Frame};
use departure_board::config::BoardConfig;
use departure_board::source::JsonDepartureSource;

/// How often the board re-evaluates its mode.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// How often board files are re-read from disk.
const RELOAD_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // A bad schedule or penalty table must stop the board before it shows anything.
    let config = match BoardConfig::from_env() {
        Ok(config) => config,
        Err(errors) => {
            error!("{errors}");
            std::process::exit(1);
        }
    };

    let source = match JsonDepartureSource::load(&config.departures_dir) {
        Ok(source) => source,
        Err(e) => {
            error!(error = %e, "Failed to load departure boards");
            std::process::exit(1);
        }
    };

    let stations = source.stations().await;
    if !stations.contains(&config.depart_from) {
        warn!(
            station = %config.depart_from,
            available = stations.len(),
            "No departure board file for station"
        );
    }

    info!(
        station = %config.depart_from,
        refresh_secs = config.refresh.as_secs(),
        "Starting departure board"
    );
    if !config.schedule.active().is_empty() {
        info!("Active times: {}", config.schedule.active());
    }
    if !config.schedule.blank().is_empty() {
        info!("Blank times: {}", config.schedule.blank());
    }
    if !config.penalties.is_empty() {
        info!(stations = config.penalties.len(), "Slow stations configured");
    }

    let mut board = BoardController::new(config, source.clone());
    let mut ticks = tokio::time::interval(TICK_INTERVAL);
    let mut reloads =
        tokio::time::interval_at(Instant::now() + RELOAD_INTERVAL, RELOAD_INTERVAL);

    loop {
        tokio::select! {
            instant = ticks.tick() => {
                let now = chrono::Local::now().naive_local();

                match board.tick(now, instant).await {
                    Frame::Departures {
                        station_name,
                        departures,
                        data_state,
                    } => debug!(
                        station = %station_name,
                        shown = departures.len(),
                        slow = departures.iter().filter(|d| d.is_slow()).count(),
                        state = ?data_state,
                        "Departures frame"
                    ),
                    frame => debug!(?frame, "Frame"),
                }
            }
            _ = reloads.tick() => match source.reload().await {
                Ok(boards) => debug!(boards, "Reloaded departure boards"),
                Err(e) => warn!(error = %e, "Failed to reload departure boards, keeping the old ones"),
            },
        }
    }
}
