//! Rotator commands.

use serde_json::{json, Value};

use crate::device::rotator::RotatorState;
use crate::error::{AlpacaError, AlpacaResult};
use crate::names;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::DeviceContext;

pub(super) fn get<B: DeviceBus>(ctx: &DeviceContext<'_, B>, command: &str) -> AlpacaResult<Value> {
    let rotator = ctx.connected_state::<RotatorState>();
    let value = match command {
        "canreverse" => json!(rotator?.can_reverse),
        "ismoving" => json!(rotator?.moving),
        "mechanicalposition" | "position" => {
            let rotator = rotator?;
            if !rotator.has_position {
                return Err(AlpacaError::NotImplemented);
            }
            json!(rotator.position)
        }
        "reverse" => json!(rotator?.reverse.unwrap_or(false)),
        "targetposition" => json!(rotator?.target_position()),
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
        "move" => move_relative(ctx, params),
        "moveabsolute" | "movemechanical" => move_absolute(ctx, params),
        "reverse" => set_reverse(ctx, params).await,
        "sync" => sync(ctx, params),
        _ => ctx.not_implemented(),
    }
}

fn positioned<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<RotatorState> {
    let rotator = ctx.connected_state::<RotatorState>()?;
    if rotator.has_position {
        Ok(rotator)
    } else {
        Err(AlpacaError::NotImplemented)
    }
}

fn not_moving(rotator: &RotatorState) -> AlpacaResult<()> {
    if rotator.moving {
        Err(AlpacaError::InvalidOperation)
    } else {
        Ok(())
    }
}

fn goto<B: DeviceBus>(ctx: &DeviceContext<'_, B>, target: f64) -> AlpacaResult<()> {
    ctx.switch(names::ROTATOR_ON_POSITION_SET, names::GOTO, true)?;
    ctx.numbers(names::ROTATOR_POSITION, &[(names::POSITION, target)])?;
    ctx.update(|r: &mut RotatorState| {
        r.target = Some(target);
        r.moving = true;
    });
    Ok(())
}

async fn halt<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    ctx.connected_state::<RotatorState>()?;
    ctx.switch(names::ROTATOR_ABORT_MOTION, names::ABORT_MOTION, true)?;
    ctx.wait(ctx.short_timeout(), |r: &RotatorState| !r.moving)
        .await
        .into_result()
}

fn move_relative<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let rotator = positioned(ctx)?;
    let offset = params.f64("Position")?;
    let mut target = rotator.position + offset;
    if !rotator.in_limits(target) {
        target = target.rem_euclid(360.0);
    }
    if !rotator.in_limits(target) {
        return Err(AlpacaError::InvalidValue);
    }
    not_moving(&rotator)?;
    goto(ctx, target)
}

fn move_absolute<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let rotator = positioned(ctx)?;
    let target = params.f64("Position")?;
    if !rotator.in_limits(target) {
        return Err(AlpacaError::InvalidValue);
    }
    not_moving(&rotator)?;
    goto(ctx, target)
}

async fn set_reverse<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let rotator = ctx.connected_state::<RotatorState>()?;
    if !rotator.can_reverse {
        return Err(AlpacaError::NotImplemented);
    }
    let reverse = params.bool("Reverse")?;
    not_moving(&rotator)?;
    let item = if reverse {
        names::REVERSED
    } else {
        names::NORMAL
    };
    ctx.switch(names::ROTATOR_DIRECTION, item, true)?;
    ctx.wait(ctx.short_timeout(), |r: &RotatorState| r.reverse == Some(reverse))
        .await
        .into_result()
}

fn sync<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let rotator = positioned(ctx)?;
    if !rotator.can_sync {
        return Err(AlpacaError::NotImplemented);
    }
    let position = params.f64("Position")?;
    if !rotator.in_limits(position) {
        return Err(AlpacaError::InvalidValue);
    }
    not_moving(&rotator)?;
    ctx.switch(names::ROTATOR_ON_POSITION_SET, names::SYNC, true)?;
    ctx.numbers(names::ROTATOR_POSITION, &[(names::POSITION, position)])
}
