//! BLE device discovery.

use std::time::Duration;

use btleplug::api::{Central, Manager as _, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Manager, Peripheral};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::ControllerError;

/// Finds a garment advertising the expected service.
pub struct BleScanner {
    adapter: Adapter,
}

impl BleScanner {
    /// Grab the first Bluetooth adapter on the host.
    pub async fn new() -> Result<Self, ControllerError> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(ControllerError::AdapterUnavailable)?;
        Ok(Self { adapter })
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    /// Scan until a peripheral advertising `service_uuid` shows up, or the
    /// timeout expires.
    pub async fn find_device(
        &self,
        service_uuid: Uuid,
        timeout: Duration,
    ) -> Result<Peripheral, ControllerError> {
        info!(%service_uuid, ?timeout, "scanning for garment");
        self.adapter
            .start_scan(ScanFilter {
                services: vec![service_uuid],
            })
            .await?;

        let found = tokio::time::timeout(timeout, self.poll_for_match(service_uuid)).await;
        self.adapter.stop_scan().await.ok();

        found.map_err(|_| ControllerError::DeviceNotFound {
            service: service_uuid,
            timeout,
        })?
    }

    async fn poll_for_match(&self, service_uuid: Uuid) -> Result<Peripheral, ControllerError> {
        loop {
            for peripheral in self.adapter.peripherals().await.unwrap_or_default() {
                if let Ok(Some(props)) = peripheral.properties().await {
                    if props.services.contains(&service_uuid) {
                        let name = props.local_name.unwrap_or_else(|| "Unknown".to_string());
                        info!(%name, "found garment");
                        return Ok(peripheral);
                    }
                    debug!(name = ?props.local_name, "ignoring non-matching peripheral");
                }
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }
    }
}
