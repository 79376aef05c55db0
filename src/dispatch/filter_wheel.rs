//! Filter wheel commands.

use serde_json::{json, Value};

use crate::device::filter_wheel::FilterWheelState;
use crate::error::{AlpacaError, AlpacaResult};
use crate::names;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::DeviceContext;

pub(super) fn get<B: DeviceBus>(ctx: &DeviceContext<'_, B>, command: &str) -> AlpacaResult<Value> {
    let wheel = ctx.connected_state::<FilterWheelState>();
    let value = match command {
        "focusoffsets" => json!(wheel?.slot_offsets()),
        "names" => json!(wheel?.slot_names()),
        "position" => json!(wheel?.position),
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
        "position" => set_position(ctx, params),
        _ => ctx.not_implemented(),
    }
}

/// Starts the move; the position reads `-1` until the wheel settles.
fn set_position<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let wheel = ctx.connected_state::<FilterWheelState>()?;
    if wheel.count == 0 {
        return Err(AlpacaError::NotImplemented);
    }
    let position = params.i32("Position")?;
    let slot = usize::try_from(position)
        .ok()
        .filter(|&slot| slot < wheel.count)
        .ok_or(AlpacaError::InvalidValue)?;
    ctx.numbers(names::WHEEL_SLOT, &[(names::SLOT, (slot + 1) as f64)])?;
    ctx.update(|w: &mut FilterWheelState| w.position = -1);
    Ok(())
}
