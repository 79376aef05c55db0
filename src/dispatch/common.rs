//! Commands shared by every device type.

use serde_json::{json, Value};

use crate::error::{AlpacaError, AlpacaResult};
use crate::names;
use crate::params::Params;
use crate::traits::DeviceBus;
use crate::wait::wait_for;

use super::DeviceContext;

/// Identity and connection getters; these answer while disconnected.
pub(super) fn get<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    command: &str,
) -> Option<AlpacaResult<Value>> {
    let identity = ctx.device.identity();
    let value = match command {
        "name" => json!(identity.name),
        "description" => ctx.device.inspect(|r| json!(r.info.description)),
        "driverinfo" => ctx.device.inspect(|r| json!(r.info.driver_info)),
        "driverversion" => ctx.device.inspect(|r| json!(r.info.driver_version)),
        "interfaceversion" => json!(identity.id.device_type.interface_version()),
        "connected" => ctx.device.inspect(|r| json!(r.connected)),
        "supportedactions" => json!(Vec::<String>::new()),
        _ => return None,
    };
    Some(Ok(value))
}

pub(super) async fn set<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    command: &str,
    params: &Params,
) -> Option<AlpacaResult<()>> {
    match command {
        "connected" => Some(set_connected(ctx, params).await),
        "action" | "commandblind" | "commandbool" | "commandstring" => {
            Some(Err(AlpacaError::ActionNotImplemented))
        }
        _ => None,
    }
}

async fn set_connected<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let connect = params.bool("Connected")?;
    let item = if connect {
        names::CONNECTED
    } else {
        names::DISCONNECTED
    };
    ctx.switch(names::CONNECTION, item, true)?;
    wait_for(
        ctx.device,
        ctx.waits.poll_interval,
        ctx.short_timeout(),
        |record| record.connected,
        connect,
    )
    .await
    .into_result()
}
