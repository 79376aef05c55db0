//! Dome commands.

use serde_json::{json, Value};

use crate::device::dome::{DomeState, ShutterStatus};
use crate::error::{AlpacaError, AlpacaResult};
use crate::names;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::{in_range, DeviceContext};

pub(super) fn get<B: DeviceBus>(ctx: &DeviceContext<'_, B>, command: &str) -> AlpacaResult<Value> {
    let dome = ctx.connected_state::<DomeState>();
    let value = match command {
        "altitude" => json!(dome?.altitude.ok_or(AlpacaError::NotImplemented)?.value),
        "azimuth" => json!(dome?.azimuth.ok_or(AlpacaError::NotImplemented)?.value),
        "athome" => json!(dome?.at_home.unwrap_or(false)),
        "atpark" => json!(dome?.parked.unwrap_or(false)),
        "canfindhome" => json!(dome?.at_home.is_some()),
        "canpark" => json!(dome?.parked.is_some()),
        "cansetaltitude" => json!(dome?.can_set_altitude()),
        "cansetazimuth" => json!(dome?.can_set_azimuth()),
        "cansetpark" => json!(dome?.can_set_park),
        "cansetshutter" => json!(dome?.shutter.is_some()),
        "canslave" => json!(dome?.can_slave),
        "cansyncazimuth" => json!(dome?.can_sync_azimuth()),
        "shutterstatus" => json!(dome?.shutter.ok_or(AlpacaError::NotImplemented)? as i32),
        "slaved" => json!(dome?.slaved.unwrap_or(false)),
        "slewing" => json!(dome?.slewing()),
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
        "abortslew" => abort_slew(ctx).await,
        "openshutter" => move_shutter(ctx, ShutterStatus::Open),
        "closeshutter" => move_shutter(ctx, ShutterStatus::Closed),
        "findhome" => find_home(ctx),
        "park" => park(ctx),
        "setpark" => set_park(ctx),
        "slaved" => set_slaved(ctx, params).await,
        "slewtoaltitude" => slew_to_altitude(ctx, params),
        "slewtoazimuth" => slew_to_azimuth(ctx, params),
        "synctoazimuth" => sync_to_azimuth(ctx, params),
        _ => ctx.not_implemented(),
    }
}

/// Azimuth in `[0, 360)`.
fn azimuth(params: &Params) -> AlpacaResult<f64> {
    let az = params.f64("Azimuth")?;
    if (0.0..360.0).contains(&az) {
        Ok(az)
    } else {
        Err(AlpacaError::InvalidValue)
    }
}

fn not_slaved(dome: &DomeState) -> AlpacaResult<()> {
    if dome.slaved == Some(true) {
        Err(AlpacaError::InvalidWhileSlaved)
    } else {
        Ok(())
    }
}

/// Slews unpark a parked dome first.
fn unpark_for_slew<B: DeviceBus>(ctx: &DeviceContext<'_, B>, dome: &DomeState) -> AlpacaResult<()> {
    if dome.parked != Some(true) {
        return Ok(());
    }
    ctx.switch(names::DOME_PARK, names::UNPARKED, true)?;
    ctx.update(|d: &mut DomeState| d.parked = Some(false));
    Ok(())
}

fn goto<B: DeviceBus>(ctx: &DeviceContext<'_, B>, item: &str, value: f64) -> AlpacaResult<()> {
    ctx.switch(names::DOME_ON_HORIZONTAL_COORDINATES_SET, names::GOTO, true)?;
    ctx.numbers(names::DOME_HORIZONTAL_COORDINATES, &[(item, value)])?;
    ctx.update(|d: &mut DomeState| d.rotating = true);
    Ok(())
}

async fn abort_slew<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    ctx.connected_state::<DomeState>()?;
    ctx.switch(names::DOME_ABORT_MOTION, names::ABORT_MOTION, true)?;
    ctx.wait(ctx.short_timeout(), |d: &DomeState| !d.slewing())
        .await
        .into_result()
}

fn move_shutter<B: DeviceBus>(ctx: &DeviceContext<'_, B>, target: ShutterStatus) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    let status = dome.shutter.ok_or(AlpacaError::NotImplemented)?;
    if status == target {
        return Ok(());
    }
    let (item, transit) = match target {
        ShutterStatus::Open => (names::OPENED, ShutterStatus::Opening),
        _ => (names::CLOSED, ShutterStatus::Closing),
    };
    ctx.switch(names::DOME_SHUTTER, item, true)?;
    ctx.update(|d: &mut DomeState| d.shutter = Some(transit));
    Ok(())
}

fn find_home<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    if dome.at_home.is_none() {
        return Err(AlpacaError::NotImplemented);
    }
    if dome.parked == Some(true) {
        return Err(AlpacaError::InvalidWhileParked);
    }
    ctx.switch(names::DOME_HOME, names::HOME, true)?;
    ctx.update(|d: &mut DomeState| d.homing = true);
    Ok(())
}

fn park<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    match dome.parked {
        None => Err(AlpacaError::NotImplemented),
        Some(true) => Ok(()),
        Some(false) => {
            ctx.switch(names::DOME_PARK, names::PARKED, true)?;
            ctx.update(|d: &mut DomeState| d.parking = true);
            Ok(())
        }
    }
}

fn set_park<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    if !dome.can_set_park {
        return Err(AlpacaError::NotImplemented);
    }
    let azimuth = dome.azimuth.ok_or(AlpacaError::NotImplemented)?;
    let mut items = vec![(names::AZ, azimuth.value)];
    if let Some(altitude) = dome.altitude {
        items.push((names::ALT, altitude.value));
    }
    ctx.numbers(names::DOME_PARK_POSITION, &items)
}

async fn set_slaved<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    if !dome.can_slave {
        return Err(AlpacaError::NotImplemented);
    }
    let slaved = params.bool("Slaved")?;
    let item = if slaved {
        names::ENABLED
    } else {
        names::DISABLED
    };
    ctx.switch(names::DOME_SLAVING, item, true)?;
    ctx.wait(ctx.short_timeout(), |d: &DomeState| d.slaved == Some(slaved))
        .await
        .into_result()
}

fn slew_to_altitude<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    if !dome.can_set_altitude() {
        return Err(AlpacaError::NotImplemented);
    }
    let alt = in_range(params.f64("Altitude")?, 0.0, 90.0)?;
    not_slaved(&dome)?;
    unpark_for_slew(ctx, &dome)?;
    goto(ctx, names::ALT, alt)
}

fn slew_to_azimuth<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    if !dome.can_set_azimuth() {
        return Err(AlpacaError::NotImplemented);
    }
    let az = azimuth(params)?;
    not_slaved(&dome)?;
    unpark_for_slew(ctx, &dome)?;
    goto(ctx, names::AZ, az)
}

fn sync_to_azimuth<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let dome = ctx.connected_state::<DomeState>()?;
    if !dome.can_sync_azimuth() {
        return Err(AlpacaError::NotImplemented);
    }
    let az = azimuth(params)?;
    ctx.switch(names::DOME_ON_HORIZONTAL_COORDINATES_SET, names::SYNC, true)?;
    ctx.numbers(names::DOME_HORIZONTAL_COORDINATES, &[(names::AZ, az)])
}
