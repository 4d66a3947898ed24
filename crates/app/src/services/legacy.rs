//! Legacy single-shot read driven by positional flags.
//!
//! Builds a throwaway device from the flags, runs one update cycle and
//! returns its report. With the external-inverter flag set, the inverter's
//! published state is the sum of its own reading and a second reading taken
//! from the external meter channel.

use std::sync::Arc;

use wattbridge_domain::combine::combine;
use wattbridge_domain::component::{Component, ComponentKind};
use wattbridge_domain::config::DeviceConfig;
use wattbridge_domain::device::{Device, component_key};
use wattbridge_domain::error::WattbridgeError;
use wattbridge_domain::id::ComponentId;
use wattbridge_domain::payload::RawPayload;
use wattbridge_domain::registry::ComponentRegistry;
use wattbridge_domain::time::{self, Timestamp};

use crate::ports::fetcher::current_state_url;
use crate::ports::{DeviceContext, UpdateFailure};
use crate::services::device_update::dispatch;
use crate::update_context::{CycleReport, MultiComponentUpdate};

/// Counter flag value that adds the device's grid counter.
pub const COUNTER_FLAG: &str = "bezug_batterx";
/// Battery flag value that adds the device's battery.
pub const BATTERY_FLAG: &str = "speicher_batterx";

const COUNTER_ID: ComponentId = ComponentId::new(0);
const BATTERY_ID: ComponentId = ComponentId::new(3);
const EXTERNAL_INVERTER_ID: ComponentId = ComponentId::new(4);

/// Positional arguments of a legacy read.
#[derive(Debug, Clone, Default)]
pub struct LegacyRequest {
    pub component_type: String,
    pub ip_address: String,
    pub num: Option<u32>,
    pub evu_counter: Option<String>,
    pub bat_module: Option<String>,
    /// Non-zero when an external inverter is wired to the device.
    pub ext_inverter: u32,
}

/// Run one legacy read.
///
/// # Errors
///
/// Returns construction errors only: an unknown component type or an
/// unusable address. Fetch and component failures end up in the returned
/// report like in [`update_device`](super::device_update::update_device).
#[tracing::instrument(skip_all, fields(component_type = %request.component_type, address = %request.ip_address))]
pub async fn read_legacy<C: DeviceContext>(
    request: LegacyRequest,
    ctx: &C,
) -> Result<CycleReport, WattbridgeError> {
    let registry = ComponentRegistry::builtin();
    let mut device = Device::with_registry(
        DeviceConfig::with_address(request.ip_address.as_str()),
        Arc::clone(&registry),
    )?;

    let primary = ComponentId::new(request.num.unwrap_or_default());
    add_default(&mut device, &registry, &request.component_type, primary)?;
    if request.evu_counter.as_deref() == Some(COUNTER_FLAG) {
        add_default(&mut device, &registry, ComponentKind::Counter.tag(), COUNTER_ID)?;
    }
    if request.bat_module.as_deref() == Some(BATTERY_FLAG) {
        add_default(&mut device, &registry, ComponentKind::Battery.tag(), BATTERY_ID)?;
    }

    let has_inverter = device
        .components()
        .values()
        .any(|c| c.kind() == ComponentKind::Inverter);
    let external = if request.ext_inverter != 0 && has_inverter {
        let mut config = registry.default_config(ComponentKind::ExternalInverter.tag())?;
        config.id = EXTERNAL_INVERTER_ID;
        Some(registry.construct(device.id(), config)?)
    } else {
        None
    };

    tracing::debug!(ext_inverter = request.ext_inverter, "legacy read");
    Ok(run_cycle(&mut device, external.as_ref(), ctx).await)
}

fn add_default(
    device: &mut Device,
    registry: &ComponentRegistry,
    tag: &str,
    id: ComponentId,
) -> Result<(), WattbridgeError> {
    let mut config = registry.default_config(tag)?;
    config.id = id;
    device.add_component(config)?;
    Ok(())
}

async fn run_cycle<C: DeviceContext>(
    device: &mut Device,
    external: Option<&Component>,
    ctx: &C,
) -> CycleReport {
    let mut slots: Vec<_> = device
        .components()
        .iter()
        .map(|(key, component)| (key.clone(), component.id()))
        .collect();
    slots.extend(external.map(|ext| (component_key(ext.id()), ext.id())));
    let mut update = MultiComponentUpdate::begin_with(ctx, device.id(), slots);

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
        let result = match external {
            Some(ext) if component.kind() == ComponentKind::Inverter => {
                let reading = read_external(ext, &url, ctx).await;
                update.record(
                    &component_key(ext.id()),
                    reading.as_ref().map(|_| ()).map_err(Clone::clone),
                );
                reading.and_then(|ext_power| {
                    publish_combined(component, &payload, ext_power, now, ctx)
                })
            }
            _ => dispatch(component, &payload, now, ctx),
        };
        if let Err(err) = &result {
            tracing::warn!(cycle = %update.cycle(), component = %key, error = %err, "component update failed");
        }
        update.record(key, result);
    }

    update.finish()
}

/// Second fetch, read through the external inverter's channel.
///
/// The two readings are taken at different instants; callers that need
/// them aligned must not rely on this path.
async fn read_external<C: DeviceContext>(
    external: &Component,
    url: &str,
    ctx: &C,
) -> Result<f64, UpdateFailure> {
    let payload = ctx.fetch(url).await.map_err(UpdateFailure::fetch)?;
    Ok(external.extract(&payload)?)
}

fn publish_combined<C: DeviceContext>(
    inverter: &mut Component,
    payload: &RawPayload,
    external_power: f64,
    now: Timestamp,
    ctx: &C,
) -> Result<(), UpdateFailure> {
    let power = inverter.extract(payload)?;
    let state = inverter.apply_derived(combine(power, external_power), now)?;
    ctx.publish(inverter.id(), state);
    Ok(())
}
