//! Cover/calibrator commands.

use serde_json::{json, Value};

use crate::device::cover_calibrator::{CalibratorStatus, CoverCalibratorState, CoverStatus};
use crate::error::{AlpacaError, AlpacaResult};
use crate::names;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::DeviceContext;

fn with_calibrator(panel: CoverCalibratorState) -> AlpacaResult<CoverCalibratorState> {
    if panel.calibrator == CalibratorStatus::NotPresent {
        Err(AlpacaError::NotImplemented)
    } else {
        Ok(panel)
    }
}

fn with_cover(panel: CoverCalibratorState) -> AlpacaResult<CoverCalibratorState> {
    if panel.cover == CoverStatus::NotPresent {
        Err(AlpacaError::NotImplemented)
    } else {
        Ok(panel)
    }
}

pub(super) fn get<B: DeviceBus>(ctx: &DeviceContext<'_, B>, command: &str) -> AlpacaResult<Value> {
    let panel = ctx.connected_state::<CoverCalibratorState>();
    let value = match command {
        "brightness" => json!(with_calibrator(panel?)?.brightness),
        "maxbrightness" => json!(with_calibrator(panel?)?.max_brightness),
        "calibratorstate" => json!(panel?.calibrator as i32),
        "coverstate" => json!(panel?.cover as i32),
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
        "calibratoron" => calibrator_on(ctx, params).await,
        "calibratoroff" => calibrator_off(ctx).await,
        "opencover" => move_cover(ctx, CoverStatus::Open),
        "closecover" => move_cover(ctx, CoverStatus::Closed),
        "haltcover" => ctx.not_implemented(),
        _ => ctx.not_implemented(),
    }
}

async fn calibrator_on<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let panel = with_calibrator(ctx.connected_state::<CoverCalibratorState>()?)?;
    let brightness = params.i32("Brightness")?;
    if !(0..=panel.max_brightness).contains(&brightness) {
        return Err(AlpacaError::InvalidValue);
    }
    ctx.switch(names::AUX_LIGHT_SWITCH, names::ON, true)?;
    ctx.numbers(
        names::AUX_LIGHT_INTENSITY,
        &[(names::LIGHT_INTENSITY, f64::from(brightness))],
    )?;
    ctx.wait(ctx.short_timeout(), |p: &CoverCalibratorState| {
        p.calibrator == CalibratorStatus::Ready
    })
    .await
    .into_result()
}

async fn calibrator_off<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    with_calibrator(ctx.connected_state::<CoverCalibratorState>()?)?;
    ctx.switch(names::AUX_LIGHT_SWITCH, names::OFF, true)?;
    ctx.wait(ctx.short_timeout(), |p: &CoverCalibratorState| {
        p.calibrator == CalibratorStatus::Off
    })
    .await
    .into_result()
}

fn move_cover<B: DeviceBus>(ctx: &DeviceContext<'_, B>, target: CoverStatus) -> AlpacaResult<()> {
    let panel = with_cover(ctx.connected_state::<CoverCalibratorState>()?)?;
    if panel.cover == target {
        return Ok(());
    }
    let item = if target == CoverStatus::Open {
        names::OPEN
    } else {
        names::CLOSE
    };
    ctx.switch(names::AUX_COVER, item, true)?;
    ctx.update(|p: &mut CoverCalibratorState| p.cover = CoverStatus::Moving);
    Ok(())
}
