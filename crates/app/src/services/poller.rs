//! Periodic polling of one device.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use wattbridge_domain::device::Device;

use crate::ports::DeviceContext;
use crate::services::device_update::update_device;

/// Run [`update_device`] every `interval` until `shutdown` flips to `true`
/// or its sender is dropped.
///
/// The first cycle runs immediately. A cycle that overruns the interval
/// delays the next tick instead of queueing a burst of cycles, so cycles
/// on one device never overlap. Returns the device so the caller keeps its
/// accumulated state.
#[tracing::instrument(skip_all, fields(device = %device.name()))]
pub async fn poll_device<C: DeviceContext>(
    mut device: Device,
    ctx: C,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> Device {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(interval_secs = interval.as_secs(), "polling started");
    loop {
        if *shutdown.borrow() {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                let report = update_device(&mut device, &ctx).await;
                tracing::debug!(
                    cycle = %report.cycle,
                    updated = report.updated(),
                    failed = report.failures().count(),
                    "cycle finished"
                );
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }
    tracing::info!("polling stopped");
    device
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingContext, Scripted};
    use serde_json::json;
    use std::sync::Arc;
    use wattbridge_domain::config::DeviceConfig;

    fn device() -> Device {
        let mut device = Device::new(DeviceConfig::with_address("10.0.0.8")).unwrap();
        device
            .add_component(json!({"id": 1, "type": "inverter"}))
            .unwrap();
        device
    }

    #[tokio::test(start_paused = true)]
    async fn should_poll_until_shutdown() {
        let ctx = Arc::new(RecordingContext::scripted(
            (0..3).map(|_| Scripted::Payload(json!({"1634": {"0": 800}}))),
        ));
        let (tx, rx) = watch::channel(false);

        let task = tokio::spawn(poll_device(
            device(),
            Arc::clone(&ctx),
            Duration::from_secs(10),
            rx,
        ));
        tokio::time::sleep(Duration::from_secs(25)).await;
        tx.send(true).unwrap();
        let device = task.await.unwrap();

        assert_eq!(ctx.fetches().len(), 3);
        assert_eq!(ctx.published().len(), 3);
        assert!(device.is_configured());
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_when_shutdown_sender_is_dropped() {
        let ctx = Arc::new(RecordingContext::default());
        let (tx, rx) = watch::channel(false);
        drop(tx);

        let task = tokio::spawn(poll_device(
            device(),
            Arc::clone(&ctx),
            Duration::from_secs(10),
            rx,
        ));

        task.await.unwrap();
        assert!(ctx.fetches().len() <= 1);
    }
}
