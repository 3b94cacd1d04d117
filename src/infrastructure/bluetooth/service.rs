//! Controller facade: public connect/command/subscribe surface.
//!
//! Owns the GATT transport and wires its notification stream into the
//! decode pipeline. All per-connection state (decode buffer, channel
//! history, sequence state, pending idle-release deadline) lives inside the
//! pump task spawned per session, so a fresh `connect()` starts from zero.

use std::sync::{Arc, Mutex};

use btleplug::api::{Central, CentralEvent, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::models::{LedPattern, SensorFrame};
use crate::domain::pipeline;
use crate::error::ControllerError;
use crate::infrastructure::bluetooth::connection::{BleConnection, ConnectionConfig};
use crate::infrastructure::bluetooth::scanner::BleScanner;

type FrameCallback = Box<dyn Fn(&SensorFrame) + Send + Sync + 'static>;
type DisconnectCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// Replaceable subscriber slots. No-op until a callback is installed.
#[derive(Default)]
struct Subscribers {
    frame: Mutex<Option<FrameCallback>>,
    disconnect: Mutex<Option<DisconnectCallback>>,
}

impl Subscribers {
    fn emit_frame(&self, frame: &SensorFrame) {
        if let Ok(slot) = self.frame.lock() {
            if let Some(cb) = slot.as_ref() {
                cb(frame);
            }
        }
    }

    fn emit_disconnect(&self) {
        if let Ok(slot) = self.disconnect.lock() {
            if let Some(cb) = slot.as_ref() {
                cb();
            }
        }
    }
}

struct Session {
    peripheral: Peripheral,
    led_characteristic: Characteristic,
    pump: JoinHandle<()>,
    watcher: JoinHandle<()>,
}

/// Host-side controller for the touch-sensing garment.
pub struct WearController {
    config: ConnectionConfig,
    subscribers: Arc<Subscribers>,
    session: Option<Session>,
}

impl WearController {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config,
            subscribers: Arc::new(Subscribers::default()),
            session: None,
        }
    }

    /// Install the analog frame subscriber. Replaces any previous callback;
    /// takes effect immediately, including for an already-running session.
    pub fn on_analog_input(&self, callback: impl Fn(&SensorFrame) + Send + Sync + 'static) {
        if let Ok(mut slot) = self.subscribers.frame.lock() {
            *slot = Some(Box::new(callback));
        }
    }

    /// Install the disconnect subscriber.
    pub fn on_disconnected(&self, callback: impl Fn() + Send + Sync + 'static) {
        if let Ok(mut slot) = self.subscribers.disconnect.lock() {
            *slot = Some(Box::new(callback));
        }
    }

    /// Scan, connect, resolve characteristics, and start streaming.
    ///
    /// Any existing session is torn down first; pipeline state never
    /// carries over between connections. Transport failures propagate
    /// without retry.
    pub async fn connect(&mut self) -> Result<(), ControllerError> {
        if self.session.is_some() {
            self.disconnect().await;
        }

        let scanner = BleScanner::new().await?;
        let peripheral = scanner
            .find_device(self.config.service_uuid, self.config.scan_timeout)
            .await?;

        let connection = BleConnection::new(self.config.clone());
        let resolved = connection.establish(peripheral).await?;

        resolved
            .peripheral
            .subscribe(&resolved.analog_characteristic)
            .await?;
        info!("analog notifications enabled");

        let pump = self
            .spawn_pump(resolved.peripheral.clone(), self.config.analog_char_uuid)
            .await?;
        let watcher = self.spawn_disconnect_watcher(
            scanner,
            resolved.peripheral.clone(),
            pump.abort_handle(),
        );

        self.session = Some(Session {
            peripheral: resolved.peripheral,
            led_characteristic: resolved.led_characteristic,
            pump,
            watcher,
        });
        Ok(())
    }

    /// Write a 3-byte LED pattern command.
    ///
    /// Fails with [`ControllerError::NotConnected`] when no session holds
    /// the LED characteristic.
    pub async fn set_led_pattern(&self, pattern: LedPattern) -> Result<(), ControllerError> {
        let session = self.session.as_ref().ok_or(ControllerError::NotConnected)?;
        debug!(?pattern, "writing LED pattern");
        session
            .peripheral
            .write(
                &session.led_characteristic,
                &pattern.encode(),
                WriteType::WithResponse,
            )
            .await?;
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Tear down the session: stop the pump (cancelling any pending idle
    /// release), stop the watcher, drop the BLE link, and notify the
    /// disconnect subscriber.
    pub async fn disconnect(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        session.pump.abort();
        session.watcher.abort();
        if let Err(e) = session.peripheral.disconnect().await {
            debug!(error = %e, "peripheral disconnect");
        }
        info!("disconnected from garment");
        self.subscribers.emit_disconnect();
    }

    /// Spawn the task that owns the decode pipeline for this session.
    async fn spawn_pump(
        &self,
        peripheral: Peripheral,
        analog_uuid: uuid::Uuid,
    ) -> Result<JoinHandle<()>, ControllerError> {
        let notifications = peripheral.notifications().await?;
        let payloads = notifications.filter_map(move |n| {
            futures::future::ready((n.uuid == analog_uuid).then_some(n.value))
        });

        let subscribers = self.subscribers.clone();
        let idle_release = self.config.idle_release;
        Ok(tokio::spawn(async move {
            pipeline::pump(Box::pin(payloads), idle_release, move |frame| {
                subscribers.emit_frame(&frame);
            })
            .await;
        }))
    }

    /// Watch the adapter event stream for this peripheral dropping off.
    ///
    /// Fires the disconnect subscriber and aborts the pump so that no
    /// release frame is emitted for a link that no longer exists.
    fn spawn_disconnect_watcher(
        &self,
        scanner: BleScanner,
        peripheral: Peripheral,
        pump: tokio::task::AbortHandle,
    ) -> JoinHandle<()> {
        let subscribers = self.subscribers.clone();
        let peripheral_id = peripheral.id();
        tokio::spawn(async move {
            let mut events = match scanner.adapter().events().await {
                Ok(events) => events,
                Err(e) => {
                    warn!(error = %e, "could not watch adapter events");
                    return;
                }
            };
            while let Some(event) = events.next().await {
                if let CentralEvent::DeviceDisconnected(id) = event {
                    if id == peripheral_id {
                        info!("garment disconnected");
                        pump.abort();
                        subscribers.emit_disconnect();
                        break;
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn led_command_without_session_is_not_connected() {
        let controller = WearController::new(ConnectionConfig::default());
        let err = controller
            .set_led_pattern(LedPattern::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::NotConnected));
    }

    #[test]
    fn subscribers_default_to_noop() {
        let subs = Subscribers::default();
        // Must not panic with empty slots.
        subs.emit_frame(&SensorFrame::released());
        subs.emit_disconnect();
    }

    #[test]
    fn installed_frame_callback_receives_frames() {
        let subs = Subscribers::default();
        let seen = Arc::new(Mutex::new(0u32));
        let counter = seen.clone();
        *subs.frame.lock().unwrap() = Some(Box::new(move |_| {
            *counter.lock().unwrap() += 1;
        }));
        subs.emit_frame(&SensorFrame::released());
        subs.emit_frame(&SensorFrame::released());
        assert_eq!(*seen.lock().unwrap(), 2);
    }
}
