//! Telescope commands.

use chrono::{NaiveDateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use crate::device::telescope::{Park, TelescopeState};
use crate::error::{AlpacaError, AlpacaResult};
use crate::names;
use crate::params::Params;
use crate::traits::DeviceBus;

use super::{in_range, DeviceContext};

/// Sidereal rate in degrees per second; bus guide rates are percent of this.
const SIDEREAL_RATE: f64 = 0.004_178_07;

const BUS_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(super) fn get<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    command: &str,
    params: &Params,
) -> AlpacaResult<Value> {
    let mount = ctx.connected_state::<TelescopeState>();
    let value = match command {
        "alignmentmode" => json!(mount?.alignment_mode()),
        "altitude" => json!(mount?.horizontal.ok_or(AlpacaError::NotImplemented)?.altitude),
        "azimuth" => json!(mount?.horizontal.ok_or(AlpacaError::NotImplemented)?.azimuth),
        "athome" => json!(mount?.home.is_some_and(|h| h.at_home)),
        "atpark" => json!(mount?.at_park()),
        "axisrates" => {
            mount?;
            axis(params)?;
            json!(Vec::<Value>::new())
        }
        "canmoveaxis" => {
            mount?;
            axis(params)?;
            json!(false)
        }
        "canfindhome" => json!(mount?.home.is_some()),
        "canpark" | "canunpark" => json!(mount?.park.is_some()),
        "canpulseguide" => json!(mount?.can_pulse_guide()),
        "cansetdeclinationrate" | "cansetrightascensionrate" | "cansetpierside"
        | "canslewaltaz" | "canslewaltazasync" | "cansyncaltaz" => {
            mount?;
            json!(false)
        }
        "cansetguiderates" => json!(mount?.guide_rates.is_some()),
        "cansetpark" => json!(mount?.can_set_park),
        "cansettracking" => json!(mount?.tracking.is_some_and(|t| t.writable)),
        "canslew" | "canslewasync" => json!(mount?.can_slew),
        "cansync" => json!(mount?.can_sync),
        "declination" => json!(mount?.declination),
        "rightascension" => json!(mount?.right_ascension),
        "declinationrate" | "rightascensionrate" => {
            mount?;
            json!(0.0)
        }
        "equatorialsystem" => json!(mount?.equatorial_system),
        "guideratedeclination" => {
            let rates = mount?.guide_rates.ok_or(AlpacaError::NotImplemented)?;
            json!(percent_to_rate(rates.dec))
        }
        "guideraterightascension" => {
            let rates = mount?.guide_rates.ok_or(AlpacaError::NotImplemented)?;
            json!(percent_to_rate(rates.ra))
        }
        "ispulseguiding" => json!(mount?.is_pulse_guiding()),
        "sideofpier" => json!(mount?.side_of_pier.ok_or(AlpacaError::NotImplemented)? as i32),
        "siderealtime" => json!(mount?.sidereal_time.ok_or(AlpacaError::NotImplemented)?),
        "siteelevation" => json!(mount?.site.ok_or(AlpacaError::NotImplemented)?.elevation),
        "sitelatitude" => json!(mount?.site.ok_or(AlpacaError::NotImplemented)?.latitude),
        "sitelongitude" => json!(mount?.site.ok_or(AlpacaError::NotImplemented)?.longitude),
        "slewing" => json!(mount?.slewing),
        "targetdeclination" => json!(mount?.target_declination.ok_or(AlpacaError::ValueNotSet)?),
        "targetrightascension" => {
            json!(mount?.target_right_ascension.ok_or(AlpacaError::ValueNotSet)?)
        }
        "tracking" => json!(mount?.tracking.is_some_and(|t| t.on)),
        "trackingrate" => json!(mount?.tracking_rate),
        "trackingrates" => {
            let mount = mount?;
            let rates: Vec<i32> = (0..names::TRACK_RATES.len())
                .filter(|&rate| mount.tracking_rates[rate])
                .map(|rate| rate as i32)
                .collect();
            json!(rates)
        }
        "utcdate" => json!(utc_date(mount?.utc.as_deref())),
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
        "findhome" => find_home(ctx).await,
        "park" => park(ctx).await,
        "unpark" => unpark(ctx).await,
        "setpark" => set_park(ctx),
        "pulseguide" => pulse_guide(ctx, params),
        "slewtocoordinates" => slew_to_coordinates(ctx, params, true).await,
        "slewtocoordinatesasync" => slew_to_coordinates(ctx, params, false).await,
        "slewtotarget" => slew_to_target(ctx, true).await,
        "slewtotargetasync" => slew_to_target(ctx, false).await,
        "synctocoordinates" => sync_to_coordinates(ctx, params),
        "synctotarget" => sync_to_target(ctx),
        "targetdeclination" => {
            ctx.connected_state::<TelescopeState>()?;
            let dec = in_range(params.f64("TargetDeclination")?, -90.0, 90.0)?;
            ctx.update(|m: &mut TelescopeState| m.target_declination = Some(dec));
            Ok(())
        }
        "targetrightascension" => {
            ctx.connected_state::<TelescopeState>()?;
            let ra = in_range(params.f64("TargetRightAscension")?, 0.0, 24.0)?;
            ctx.update(|m: &mut TelescopeState| m.target_right_ascension = Some(ra));
            Ok(())
        }
        "tracking" => set_tracking(ctx, params).await,
        "trackingrate" => set_tracking_rate(ctx, params).await,
        "guideratedeclination" => set_guide_rate(ctx, params, Axis::Declination).await,
        "guideraterightascension" => set_guide_rate(ctx, params, Axis::RightAscension).await,
        "sitelatitude" => set_site(ctx, params, SiteField::Latitude).await,
        "sitelongitude" => set_site(ctx, params, SiteField::Longitude).await,
        "siteelevation" => set_site(ctx, params, SiteField::Elevation).await,
        "utcdate" => set_utc_date(ctx, params),
        _ => ctx.not_implemented(),
    }
}

fn axis(params: &Params) -> AlpacaResult<i32> {
    let axis = params.i32("Axis")?;
    if (0..=2).contains(&axis) {
        Ok(axis)
    } else {
        Err(AlpacaError::InvalidValue)
    }
}

fn percent_to_rate(percent: f64) -> f64 {
    percent / 100.0 * SIDEREAL_RATE
}

fn rate_to_percent(rate: f64) -> f64 {
    (rate / SIDEREAL_RATE * 100.0).round()
}

/// Bus time is naive UTC; Alpaca wants ISO-8601 with a zone.
fn utc_date(bus_time: Option<&str>) -> String {
    match bus_time {
        Some(time) => match NaiveDateTime::parse_from_str(time, BUS_TIME_FORMAT) {
            Ok(naive) => naive.and_utc().to_rfc3339_opts(SecondsFormat::Millis, true),
            Err(_) => time.to_string(),
        },
        None => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

fn parse_utc_date(value: &str) -> AlpacaResult<NaiveDateTime> {
    let value = value.trim();
    if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.naive_utc());
    }
    let naive = value.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|_| AlpacaError::InvalidValue)
}

fn not_parked(mount: &TelescopeState) -> AlpacaResult<()> {
    if mount.at_park() {
        Err(AlpacaError::InvalidWhileParked)
    } else {
        Ok(())
    }
}

fn coordinates(params: &Params) -> AlpacaResult<(f64, f64)> {
    let ra = in_range(params.f64("RightAscension")?, 0.0, 24.0)?;
    let dec = in_range(params.f64("Declination")?, -90.0, 90.0)?;
    Ok((ra, dec))
}

async fn abort_slew<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    not_parked(&mount)?;
    ctx.switch(names::MOUNT_ABORT_MOTION, names::ABORT_MOTION, true)?;
    ctx.wait(ctx.short_timeout(), |m: &TelescopeState| !m.slewing)
        .await
        .into_result()
}

async fn find_home<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if mount.home.is_none() {
        return Err(AlpacaError::NotImplemented);
    }
    not_parked(&mount)?;
    ctx.switch(names::MOUNT_HOME, names::HOME, true)?;
    ctx.wait(ctx.slew_timeout(), |m: &TelescopeState| {
        m.home.is_some_and(|h| h.at_home && !h.homing)
    })
    .await
    .into_result()
}

async fn park<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    let park = mount.park.ok_or(AlpacaError::NotImplemented)?;
    if park.parked {
        return Ok(());
    }
    ctx.switch(names::MOUNT_PARK, names::PARKED, true)?;
    ctx.wait(ctx.slew_timeout(), TelescopeState::at_park)
        .await
        .into_result()
}

async fn unpark<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    let park = mount.park.ok_or(AlpacaError::NotImplemented)?;
    if !park.can_unpark {
        ctx.update(|m: &mut TelescopeState| {
            m.park = Some(Park {
                parked: false,
                ..park
            })
        });
        return Ok(());
    }
    if !park.parked {
        return Ok(());
    }
    ctx.switch(names::MOUNT_PARK, names::UNPARKED, true)?;
    ctx.wait(ctx.short_timeout(), |m: &TelescopeState| !m.at_park())
        .await
        .into_result()
}

fn set_park<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.can_set_park {
        return Err(AlpacaError::NotImplemented);
    }
    ctx.switch(names::MOUNT_PARK_SET, names::CURRENT, true)
}

fn pulse_guide<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.can_pulse_guide() {
        return Err(AlpacaError::NotImplemented);
    }
    let direction = params.i32("Direction")?;
    let duration = params.i32("Duration")?;
    if duration <= 0 {
        return Err(AlpacaError::InvalidValue);
    }
    let (property, items, declination) = match direction {
        0 => (names::GUIDER_GUIDE_DEC, [names::NORTH, names::SOUTH], true),
        1 => (names::GUIDER_GUIDE_DEC, [names::SOUTH, names::NORTH], true),
        2 => (names::GUIDER_GUIDE_RA, [names::EAST, names::WEST], false),
        3 => (names::GUIDER_GUIDE_RA, [names::WEST, names::EAST], false),
        _ => return Err(AlpacaError::InvalidValue),
    };
    let port = if declination {
        mount.guide_dec
    } else {
        mount.guide_ra
    };
    if port.is_none() {
        return Err(AlpacaError::NotImplemented);
    }
    not_parked(&mount)?;

    ctx.numbers(property, &[(items[0], f64::from(duration)), (items[1], 0.0)])?;
    ctx.update(|m: &mut TelescopeState| {
        if declination {
            m.guide_dec = Some(true);
        } else {
            m.guide_ra = Some(true);
        }
    });
    Ok(())
}

/// Issue a goto to `(ra, dec)`, optionally waiting for the slew to finish.
async fn slew<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    ra: f64,
    dec: f64,
    wait: bool,
) -> AlpacaResult<()> {
    ctx.switch(names::MOUNT_ON_COORDINATES_SET, names::TRACK, true)?;
    ctx.numbers(names::MOUNT_EQUATORIAL_COORDINATES, &[(names::RA, ra), (names::DEC, dec)])?;
    ctx.update(|m: &mut TelescopeState| m.slewing = true);
    if !wait {
        return Ok(());
    }
    ctx.wait(ctx.slew_timeout(), |m: &TelescopeState| !m.slewing)
        .await
        .into_result()
}

fn sync<B: DeviceBus>(ctx: &DeviceContext<'_, B>, ra: f64, dec: f64) -> AlpacaResult<()> {
    ctx.switch(names::MOUNT_ON_COORDINATES_SET, names::SYNC, true)?;
    ctx.numbers(names::MOUNT_EQUATORIAL_COORDINATES, &[(names::RA, ra), (names::DEC, dec)])
}

fn stage_target<B: DeviceBus>(ctx: &DeviceContext<'_, B>, ra: f64, dec: f64) {
    ctx.update(|m: &mut TelescopeState| {
        m.target_right_ascension = Some(ra);
        m.target_declination = Some(dec);
    });
}

fn staged_target(mount: &TelescopeState) -> AlpacaResult<(f64, f64)> {
    match (mount.target_right_ascension, mount.target_declination) {
        (Some(ra), Some(dec)) => Ok((ra, dec)),
        _ => Err(AlpacaError::InvalidOperation),
    }
}

async fn slew_to_coordinates<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    params: &Params,
    wait: bool,
) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.can_slew {
        return Err(AlpacaError::NotImplemented);
    }
    not_parked(&mount)?;
    let (ra, dec) = coordinates(params)?;
    stage_target(ctx, ra, dec);
    slew(ctx, ra, dec, wait).await
}

async fn slew_to_target<B: DeviceBus>(ctx: &DeviceContext<'_, B>, wait: bool) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.can_slew {
        return Err(AlpacaError::NotImplemented);
    }
    let (ra, dec) = staged_target(&mount)?;
    not_parked(&mount)?;
    slew(ctx, ra, dec, wait).await
}

fn sync_to_coordinates<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.can_sync {
        return Err(AlpacaError::NotImplemented);
    }
    not_parked(&mount)?;
    let (ra, dec) = coordinates(params)?;
    stage_target(ctx, ra, dec);
    sync(ctx, ra, dec)
}

fn sync_to_target<B: DeviceBus>(ctx: &DeviceContext<'_, B>) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.can_sync {
        return Err(AlpacaError::NotImplemented);
    }
    let (ra, dec) = staged_target(&mount)?;
    not_parked(&mount)?;
    sync(ctx, ra, dec)
}

async fn set_tracking<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.tracking.is_some_and(|t| t.writable) {
        return Err(AlpacaError::NotImplemented);
    }
    let on = params.bool("Tracking")?;
    let item = if on { names::ON } else { names::OFF };
    ctx.switch(names::MOUNT_TRACKING, item, true)?;
    ctx.wait(ctx.short_timeout(), |m: &TelescopeState| {
        m.tracking.is_some_and(|t| t.on == on)
    })
    .await
    .into_result()
}

async fn set_tracking_rate<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    params: &Params,
) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if !mount.tracking_rates.iter().any(|&offered| offered) {
        return Err(AlpacaError::NotImplemented);
    }
    let rate = params.i32("TrackingRate")?;
    let index = usize::try_from(rate)
        .ok()
        .filter(|&i| i < names::TRACK_RATES.len() && mount.tracking_rates[i])
        .ok_or(AlpacaError::InvalidValue)?;
    ctx.switch(names::MOUNT_TRACK_RATE, names::TRACK_RATES[index], true)?;
    ctx.wait(ctx.short_timeout(), |m: &TelescopeState| m.tracking_rate == rate)
        .await
        .into_result()
}

#[derive(Clone, Copy)]
enum Axis {
    RightAscension,
    Declination,
}

async fn set_guide_rate<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    params: &Params,
    axis: Axis,
) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    let rates = mount.guide_rates.ok_or(AlpacaError::NotImplemented)?;
    let name = match axis {
        Axis::RightAscension => "GuideRateRightAscension",
        Axis::Declination => "GuideRateDeclination",
    };
    let rate = params.f64(name)?;
    if rate <= 0.0 || rate > SIDEREAL_RATE {
        return Err(AlpacaError::InvalidValue);
    }
    let percent = rate_to_percent(rate);
    let (ra, dec) = match axis {
        Axis::RightAscension => (percent, rates.dec),
        Axis::Declination => (rates.ra, percent),
    };
    ctx.numbers(names::MOUNT_GUIDE_RATE, &[(names::RA, ra), (names::DEC, dec)])?;
    ctx.wait(ctx.short_timeout(), |m: &TelescopeState| {
        m.guide_rates.is_some_and(|r| match axis {
            Axis::RightAscension => r.ra == percent,
            Axis::Declination => r.dec == percent,
        })
    })
    .await
    .into_result()
}

#[derive(Clone, Copy)]
enum SiteField {
    Latitude,
    Longitude,
    Elevation,
}

async fn set_site<B: DeviceBus>(
    ctx: &DeviceContext<'_, B>,
    params: &Params,
    field: SiteField,
) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if mount.site.is_none() {
        return Err(AlpacaError::NotImplemented);
    }
    let (item, value) = match field {
        SiteField::Latitude => (names::LATITUDE, in_range(params.f64("SiteLatitude")?, -90.0, 90.0)?),
        SiteField::Longitude => (
            names::LONGITUDE,
            in_range(params.f64("SiteLongitude")?, -180.0, 180.0)?,
        ),
        SiteField::Elevation => (
            names::ELEVATION,
            in_range(params.f64("SiteElevation")?, -300.0, 10000.0)?,
        ),
    };
    let sent = if matches!(field, SiteField::Longitude) && value < 0.0 {
        value + 360.0
    } else {
        value
    };
    ctx.numbers(names::GEOGRAPHIC_COORDINATES, &[(item, sent)])?;
    ctx.wait(ctx.short_timeout(), |m: &TelescopeState| {
        m.site.is_some_and(|site| {
            let current = match field {
                SiteField::Latitude => site.latitude,
                SiteField::Longitude => site.longitude,
                SiteField::Elevation => site.elevation,
            };
            (current - value).abs() < 1e-6
        })
    })
    .await
    .into_result()
}

fn set_utc_date<B: DeviceBus>(ctx: &DeviceContext<'_, B>, params: &Params) -> AlpacaResult<()> {
    let mount = ctx.connected_state::<TelescopeState>()?;
    if mount.utc.is_none() {
        return Err(AlpacaError::NotImplemented);
    }
    let time = parse_utc_date(params.require("UTCDate")?)?;
    ctx.text(
        names::UTC_TIME,
        names::TIME,
        &time.format(BUS_TIME_FORMAT).to_string(),
    )
}
