//! Switch panel commands.
//!
//! Every per-switch command takes an `Id`; ids that do not parse or do
//! not resolve to a switch are `InvalidValue`.

use serde_json::{json, Value};

use crate::device::switch::{BankKind, SwitchChannel, SwitchState};
use crate::error::{AlpacaError, AlpacaResult};
use crate::params::Params;
use crate::traits::DeviceBus;

use super::{in_range, DeviceContext};

fn switch_id(params: &Params) -> AlpacaResult<i64> {
    params.i32("Id").map(i64::from)
}

fn channel(panel: &SwitchState, id: i64) -> AlpacaResult<SwitchChannel> {
    panel.channel(id).cloned().ok_or(AlpacaError::InvalidValue)
}

pub(super) fn get<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    command: &str,
    params: &Params,
) -> AlpacaResult<Value> {
    let panel = ctx.connected_state::<SwitchState>();
    let value = match command {
        "maxswitch" => json!(panel?.max_switch()),
        "canwrite" => json!(channel(&panel?, switch_id(params)?)?.writable),
        "getswitch" => {
            let channel = channel(&panel?, switch_id(params)?)?;
            json!(channel.value > channel.min)
        }
        "getswitchvalue" => json!(channel(&panel?, switch_id(params)?)?.value),
        "minswitchvalue" => json!(channel(&panel?, switch_id(params)?)?.min),
        "maxswitchvalue" => json!(channel(&panel?, switch_id(params)?)?.max),
        "switchstep" => json!(channel(&panel?, switch_id(params)?)?.step),
        "getswitchname" => {
            let panel = panel?;
            let id = switch_id(params)?;
            json!(panel.switch_name(id).ok_or(AlpacaError::InvalidValue)?)
        }
        "getswitchdescription" => {
            let panel = panel?;
            let id = switch_id(params)?;
            json!(panel.switch_description(id).ok_or(AlpacaError::InvalidValue)?)
        }
        _ => return ctx.not_implemented(),
    };
    Ok(value)
}

pub(super) async fn set<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    command: &str,
    params: &Params,
) -> AlpacaResult<()> {
    match command {
        "setswitch" => {
            let (id, channel) = writable_channel(ctx, params)?;
            let value = if params.bool("State")? {
                channel.max
            } else {
                channel.min
            };
            write(ctx, id, &channel, value).await
        }
        "setswitchvalue" => {
            let (id, channel) = writable_channel(ctx, params)?;
            let value = in_range(params.f64("Value")?, channel.min, channel.max)?;
            write(ctx, id, &channel, value).await
        }
        "setswitchname" => set_switch_name(ctx, params),
        _ => ctx.not_implemented(),
    }
}

fn writable_channel<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    params: &Params,
) -> AlpacaResult<(i64, SwitchChannel)> {
    let panel = ctx.connected_state::<SwitchState>()?;
    let id = switch_id(params)?;
    let channel = channel(&panel, id)?;
    if !channel.writable {
        return Err(AlpacaError::NotImplemented);
    }
    Ok((id, channel))
}

async fn write<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    id: i64,
    channel: &SwitchChannel,
    value: f64,
) -> AlpacaResult<()> {
    let panel = ctx.connected_state::<SwitchState>()?;
    let (kind, _) = panel.resolve(id).ok_or(AlpacaError::InvalidValue)?;

    let expected = if channel.boolean {
        let on = value > channel.min;
        ctx.switch(kind.property(), &channel.item, on)?;
        if on {
            1.0
        } else {
            0.0
        }
    } else {
        ctx.numbers(kind.property(), &[(channel.item.as_str(), value)])?;
        value
    };

    // Drivers quantize to their step, so a settled value only lands near the request.
    let tolerance = settle_tolerance(channel.step);
    ctx.wait(ctx.short_timeout(), |panel: &SwitchState| {
        panel
            .channel(id)
            .is_some_and(|c| (c.value - expected).abs() <= tolerance)
    })
    .await
    .into_result()
}

fn settle_tolerance(step: f64) -> f64 {
    if step > 0.0 {
        step / 2.0
    } else {
        1e-6
    }
}

fn set_switch_name<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let panel = ctx.connected_state::<SwitchState>()?;
    let id = switch_id(params)?;
    let (kind, index): (BankKind, usize) = panel.resolve(id).ok_or(AlpacaError::InvalidValue)?;
    let bank = panel.bank(kind);
    if !bank.has_names {
        return Err(AlpacaError::NotImplemented);
    }
    let (item, _) = bank.names.get(index).ok_or(AlpacaError::NotImplemented)?;
    let name = params.require("Name")?;
    ctx.text(kind.names_property(), item, name)
}
