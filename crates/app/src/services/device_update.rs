//! Device update cycle: one fetch, fanned out to every component.

use wattbridge_domain::component::Component;
use wattbridge_domain::device::Device;
use wattbridge_domain::payload::RawPayload;
use wattbridge_domain::time::{self, Timestamp};

use crate::ports::fetcher::current_state_url;
use crate::ports::{DeviceContext, UpdateFailure};
use crate::update_context::{CycleReport, MultiComponentUpdate};

/// Run one update cycle for `device`.
///
/// Fetch failures and component failures are recorded in the returned
/// report and delivered to the context's status reporter; they never
/// escape this function. A device without components is not fetched.
#[tracing::instrument(skip_all, fields(device = %device.name(), device_id = %device.id()))]
pub async fn update_device<C: DeviceContext>(device: &mut Device, ctx: &C) -> CycleReport {
    tracing::debug!(components = ?device.components().keys().collect::<Vec<_>>(), "start device reading");

    let mut update = MultiComponentUpdate::begin(ctx, device);
    if update.is_empty() {
        tracing::warn!(
            device = device.name(),
            "no values read: no components configured yet"
        );
        return update.finish();
    }

    let url = current_state_url(device.address());
    let payload = match ctx.fetch(&url).await {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(cycle = %update.cycle(), %url, error = %err, "device reading failed");
            update.fail_all(err);
            return update.finish();
        }
    };

    let now = time::now();
    for (key, component) in device.components_mut() {
        let result = dispatch(component, &payload, now, ctx);
        if let Err(err) = &result {
            tracing::warn!(cycle = %update.cycle(), component = %key, error = %err, "component update failed");
        }
        update.record(key, result);
    }

    update.finish()
}

/// Update one component from the shared payload and publish its state.
pub(crate) fn dispatch<C: DeviceContext>(
    component: &mut Component,
    payload: &RawPayload,
    now: Timestamp,
    ctx: &C,
) -> Result<(), UpdateFailure> {
    let state = component.update(payload, now)?;
    ctx.publish(component.id(), state);
    Ok(())
}
