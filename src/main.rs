//! Console monitor: connect to the garment and log incoming frames.

use anyhow::Result;
use tracing::{info, warn};
use weartouch::infrastructure::logging;
use weartouch::{ConnectionConfig, LedPattern, SettingsService, WearController};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = SettingsService::new()?;
    let _logging_guard = logging::init_logger(&settings.get().log_settings)?;
    info!("Starting weartouch monitor");

    let config = ConnectionConfig::from_settings(settings.get())?;
    let mut controller = WearController::new(config);

    controller.on_analog_input(|frame| {
        info!(
            proximity = frame.proximity,
            lines = ?frame.lines,
            "frame"
        );
    });
    controller.on_disconnected(|| {
        warn!("garment disconnected");
    });

    controller.connect().await?;
    info!("connected; signalling with the default LED pattern");
    controller.set_led_pattern(LedPattern::default()).await?;

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    controller.disconnect().await;
    Ok(())
}
