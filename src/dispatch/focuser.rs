//! Focuser commands.

use serde_json::{json, Value};

use crate::device::focuser::FocuserState;
use crate::error::{AlpacaError, AlpacaResult};
use crate::names;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::DeviceContext;

pub(super) fn get<B: DeviceBus>(ctx: &DeviceContext<'_, B>, command: &str) -> AlpacaResult<Value> {
    let focuser = ctx.connected_state::<FocuserState>();
    let value = match command {
        "absolute" => json!(focuser?.absolute),
        "ismoving" => json!(focuser?.is_moving()),
        "maxincrement" => json!(focuser?.max_increment),
        "maxstep" => json!(focuser?.max_step),
        "position" => {
            let focuser = focuser?;
            if !focuser.absolute {
                return Err(AlpacaError::NotImplemented);
            }
            json!(focuser.position)
        }
        "tempcomp" => json!(focuser?.temp_comp.unwrap_or(false)),
        "tempcompavailable" => json!(focuser?.temp_comp.is_some()),
        "temperature" => json!(focuser?.temperature.ok_or(AlpacaError::NotImplemented)?),
        "stepsize" => return ctx.not_implemented(),
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
        "halt" => halt(ctx).await,
        "move" => move_to(ctx, params),
        "tempcomp" => set_temp_comp(ctx, params).await,
        _ => ctx.not_implemented(),
    }
}

async fn halt<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    ctx.connected_state::<FocuserState>()?;
    ctx.switch(names::FOCUSER_ABORT_MOTION, names::ABORT_MOTION, true)?;
    ctx.wait(ctx.short_timeout(), |f: &FocuserState| !f.is_moving())
        .await
        .into_result()
}

/// Absolute focusers take a target position, relative ones a signed step count.
fn move_to<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let focuser = ctx.connected_state::<FocuserState>()?;
    // Driver limits can be anything, including negative.
    let max_step = focuser.max_step.max(0);
    let max_increment = focuser.max_increment.max(0);
    if !focuser.absolute && max_increment == 0 {
        return Err(AlpacaError::NotImplemented);
    }
    let position = params.i32("Position")?;
    if focuser.temp_comp == Some(true) {
        return Err(AlpacaError::InvalidOperation);
    }

    if focuser.absolute {
        let target = position.clamp(0, max_step);
        ctx.switch(names::FOCUSER_ON_POSITION_SET, names::GOTO, true)?;
        ctx.numbers(
            names::FOCUSER_POSITION,
            &[(names::POSITION, f64::from(target) + focuser.offset)],
        )?;
        ctx.update(|f: &mut FocuserState| f.position_busy = true);
    } else {
        let steps = position.clamp(-max_increment, max_increment);
        if steps == 0 {
            return Ok(());
        }
        let direction = if steps > 0 {
            names::MOVE_OUTWARD
        } else {
            names::MOVE_INWARD
        };
        ctx.switch(names::FOCUSER_DIRECTION, direction, true)?;
        ctx.numbers(names::FOCUSER_STEPS, &[(names::STEPS, f64::from(steps.abs()))])?;
        ctx.update(|f: &mut FocuserState| f.steps_busy = true);
    }
    Ok(())
}

async fn set_temp_comp<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let focuser = ctx.connected_state::<FocuserState>()?;
    if focuser.temp_comp.is_none() {
        return Err(AlpacaError::NotImplemented);
    }
    let on = params.bool("TempComp")?;
    let item = if on { names::AUTOMATIC } else { names::MANUAL };
    ctx.switch(names::FOCUSER_MODE, item, true)?;
    ctx.wait(ctx.short_timeout(), |f: &FocuserState| f.temp_comp == Some(on))
        .await
        .into_result()
}
