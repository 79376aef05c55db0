//! Telescope state: mount properties plus guider ports.

use crate::names;
use crate::property::Property;

use super::{state_block_variant, DeviceState, DeviceType, StateBlock};

/// Side of pier, in Alpaca `PierSide` numbering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PierSide {
    /// Normal pointing state.
    East = 0,
    /// Through the pole pointing state.
    West = 1,
}

/// Park support reported by the mount.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Park {
    /// Parked and settled.
    pub parked: bool,
    /// The bus exposes an explicit unpark item.
    pub can_unpark: bool,
}

/// Home support reported by the mount.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Home {
    /// At the home position.
    pub at_home: bool,
    /// Homing in progress.
    pub homing: bool,
}

/// Guide rates as reported on the bus, in percent of sidereal rate.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GuideRates {
    /// Right ascension rate.
    pub ra: f64,
    /// Declination rate.
    pub dec: f64,
}

/// Tracking switch.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tracking {
    /// Tracking enabled.
    pub on: bool,
    /// Clients may change tracking.
    pub writable: bool,
}

/// Observing site.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Site {
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive, in [-180, 180].
    pub longitude: f64,
    /// Elevation in meters.
    pub elevation: f64,
}

/// Horizontal position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Horizontal {
    /// Altitude in degrees.
    pub altitude: f64,
    /// Azimuth in degrees.
    pub azimuth: f64,
}

/// Telescope state block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TelescopeState {
    /// Park support and status.
    pub park: Option<Park>,
    /// Current position can be stored as park position.
    pub can_set_park: bool,
    /// Home support and status.
    pub home: Option<Home>,
    /// Guide rates; present means they can be set.
    pub guide_rates: Option<GuideRates>,
    /// Local sidereal time in hours.
    pub sidereal_time: Option<f64>,
    /// Alpaca `EquatorialCoordinateType`.
    pub equatorial_system: i32,
    /// Right ascension in hours.
    pub right_ascension: f64,
    /// Declination in degrees.
    pub declination: f64,
    /// Slew in progress.
    pub slewing: bool,
    /// Horizontal coordinates.
    pub horizontal: Option<Horizontal>,
    /// Goto is available.
    pub can_slew: bool,
    /// Sync is available.
    pub can_sync: bool,
    /// Tracking switch.
    pub tracking: Option<Tracking>,
    /// Alpaca `DriveRates` value in effect.
    pub tracking_rate: i32,
    /// Which `DriveRates` the mount offers.
    pub tracking_rates: [bool; 4],
    /// Side of pier.
    pub side_of_pier: Option<PierSide>,
    /// Staged target right ascension.
    pub target_right_ascension: Option<f64>,
    /// Staged target declination.
    pub target_declination: Option<f64>,
    /// Observing site.
    pub site: Option<Site>,
    /// UTC time reported by the mount.
    pub utc: Option<String>,
    /// North/south guide port; the value is pulse-in-progress.
    pub guide_dec: Option<bool>,
    /// East/west guide port; the value is pulse-in-progress.
    pub guide_ra: Option<bool>,
}

impl TelescopeState {
    /// Pulse guiding is possible on at least one axis.
    pub fn can_pulse_guide(&self) -> bool {
        self.guide_ra.is_some() || self.guide_dec.is_some()
    }

    /// A guide pulse is in progress.
    pub fn is_pulse_guiding(&self) -> bool {
        self.guide_ra == Some(true) || self.guide_dec == Some(true)
    }

    /// Parked and settled.
    pub fn at_park(&self) -> bool {
        self.park.is_some_and(|p| p.parked)
    }

    /// Alpaca `AlignmentModes`: German polar when the mount reports a pier side.
    pub fn alignment_mode(&self) -> i32 {
        if self.side_of_pier.is_some() {
            2
        } else {
            1
        }
    }
}

fn epoch_to_system(epoch: f64) -> i32 {
    match epoch.round() as i64 {
        0 => 1,
        2000 => 2,
        2050 => 3,
        1950 => 4,
        _ => 0,
    }
}

impl StateBlock for TelescopeState {
    const DEVICE_TYPE: DeviceType = DeviceType::Telescope;

    state_block_variant!(TelescopeState, Telescope);

    fn apply(&mut self, property: &Property) {
        match property.name.as_str() {
            names::MOUNT_PARK => {
                let park = self.park.get_or_insert_with(Park::default);
                park.parked = property.is_ok() && property.switch(names::PARKED) == Some(true);
                park.can_unpark = property.item(names::UNPARKED).is_some();
            }
            names::MOUNT_PARK_SET => {
                self.can_set_park = property.perm.is_writable();
            }
            names::MOUNT_HOME => {
                let home = self.home.get_or_insert_with(Home::default);
                home.homing = property.is_busy();
                home.at_home = property.is_ok() && property.switch(names::HOME) == Some(true);
            }
            names::MOUNT_GUIDE_RATE => {
                if let Some(ra) = property.number(names::RA) {
                    let dec = property.number(names::DEC).unwrap_or(ra);
                    self.guide_rates = Some(GuideRates { ra, dec });
                }
            }
            names::MOUNT_LST_TIME => {
                if let Some(time) = property.number(names::TIME) {
                    self.sidereal_time = Some(time);
                }
            }
            names::MOUNT_EPOCH => {
                if let Some(epoch) = property.number(names::EPOCH) {
                    self.equatorial_system = epoch_to_system(epoch);
                }
            }
            names::MOUNT_ON_COORDINATES_SET => {
                self.can_slew = property.item(names::TRACK).is_some();
                self.can_sync = property.item(names::SYNC).is_some();
            }
            names::MOUNT_TRACKING => {
                self.tracking = Some(Tracking {
                    on: property.switch(names::ON) == Some(true),
                    writable: property.perm.is_writable(),
                });
            }
            names::MOUNT_EQUATORIAL_COORDINATES => {
                self.slewing = property.is_busy();
                if let Some(ra) = property.number(names::RA) {
                    self.right_ascension = ra;
                }
                if let Some(dec) = property.number(names::DEC) {
                    self.declination = dec;
                }
            }
            names::MOUNT_HORIZONTAL_COORDINATES => {
                let horizontal = self.horizontal.get_or_insert_with(Horizontal::default);
                if let Some(alt) = property.number(names::ALT) {
                    horizontal.altitude = alt;
                }
                if let Some(az) = property.number(names::AZ) {
                    horizontal.azimuth = az;
                }
            }
            names::MOUNT_TRACK_RATE => {
                if !property.is_ok() {
                    return;
                }
                for (rate, name) in names::TRACK_RATES.iter().enumerate() {
                    if let Some(on) = property.switch(name) {
                        self.tracking_rates[rate] = true;
                        if on {
                            self.tracking_rate = rate as i32;
                        }
                    }
                }
            }
            names::MOUNT_SIDE_OF_PIER => {
                self.side_of_pier = Some(if property.switch(names::WEST) == Some(true) {
                    PierSide::West
                } else {
                    PierSide::East
                });
            }
            names::GEOGRAPHIC_COORDINATES => {
                let site = self.site.get_or_insert_with(Site::default);
                if let Some(latitude) = property.number(names::LATITUDE) {
                    site.latitude = latitude;
                }
                if let Some(longitude) = property.number(names::LONGITUDE) {
                    site.longitude = if longitude > 180.0 {
                        longitude - 360.0
                    } else {
                        longitude
                    };
                }
                if let Some(elevation) = property.number(names::ELEVATION) {
                    site.elevation = elevation;
                }
            }
            names::UTC_TIME => {
                if let Some(time) = property.text(names::TIME) {
                    self.utc = Some(time.to_string());
                }
            }
            names::GUIDER_GUIDE_DEC => self.guide_dec = Some(property.is_busy()),
            names::GUIDER_GUIDE_RA => self.guide_ra = Some(property.is_busy()),
            _ => {}
        }
    }

    fn remove(&mut self, property: &str) {
        match property {
            names::MOUNT_PARK => self.park = None,
            names::MOUNT_PARK_SET => self.can_set_park = false,
            names::MOUNT_HOME => self.home = None,
            names::MOUNT_GUIDE_RATE => self.guide_rates = None,
            names::MOUNT_LST_TIME => self.sidereal_time = None,
            names::MOUNT_ON_COORDINATES_SET => {
                self.can_slew = false;
                self.can_sync = false;
            }
            names::MOUNT_TRACKING => self.tracking = None,
            names::MOUNT_HORIZONTAL_COORDINATES => self.horizontal = None,
            names::MOUNT_TRACK_RATE => self.tracking_rates = [false; 4],
            names::MOUNT_SIDE_OF_PIER => self.side_of_pier = None,
            names::GEOGRAPHIC_COORDINATES => self.site = None,
            names::UTC_TIME => self.utc = None,
            names::GUIDER_GUIDE_DEC => self.guide_dec = None,
            names::GUIDER_GUIDE_RA => self.guide_ra = None,
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{Item, Permission, PropertyState};

    fn mount(name: &str) -> Property {
        Property::new("Mount", name)
    }

    #[test]
    fn park_capability_survives_unrelated_updates() {
        let mut state = TelescopeState::default();
        state.apply(
            &mount(names::MOUNT_PARK)
                .with_item(Item::switch(names::PARKED, false))
                .with_item(Item::switch(names::UNPARKED, true)),
        );
        state.apply(
            &mount(names::MOUNT_EQUATORIAL_COORDINATES)
                .with_item(Item::number(names::RA, 5.5))
                .with_item(Item::number(names::DEC, -20.0)),
        );

        let park = state.park.unwrap();
        assert!(!park.parked);
        assert!(park.can_unpark);
        assert_eq!(state.right_ascension, 5.5);
    }

    #[test]
    fn parked_only_when_settled() {
        let mut state = TelescopeState::default();
        let parked = mount(names::MOUNT_PARK).with_item(Item::switch(names::PARKED, true));
        state.apply(&parked.clone().with_state(PropertyState::Busy));
        assert!(!state.at_park());
        state.apply(&parked);
        assert!(state.at_park());
        assert!(!state.park.unwrap().can_unpark);
    }

    #[test]
    fn busy_coordinates_mean_slewing() {
        let mut state = TelescopeState::default();
        state.apply(
            &mount(names::MOUNT_EQUATORIAL_COORDINATES)
                .with_state(PropertyState::Busy)
                .with_item(Item::number(names::RA, 1.0)),
        );
        assert!(state.slewing);
    }

    #[test]
    fn single_guide_rate_applies_to_both_axes() {
        let mut state = TelescopeState::default();
        state.apply(&mount(names::MOUNT_GUIDE_RATE).with_item(Item::number(names::RA, 50.0)));
        assert_eq!(state.guide_rates, Some(GuideRates { ra: 50.0, dec: 50.0 }));
    }

    #[test]
    fn track_rates_collected_from_items() {
        let mut state = TelescopeState::default();
        let rates = mount(names::MOUNT_TRACK_RATE)
            .with_item(Item::switch("SIDEREAL", false))
            .with_item(Item::switch("SOLAR", true));
        state.apply(&rates);
        state.apply(&rates);
        assert_eq!(state.tracking_rates, [true, false, true, false]);
        assert_eq!(state.tracking_rate, 2);
    }

    #[test]
    fn track_rates_ignored_unless_ok() {
        let mut state = TelescopeState::default();
        state.apply(
            &mount(names::MOUNT_TRACK_RATE)
                .with_state(PropertyState::Busy)
                .with_item(Item::switch("LUNAR", true)),
        );
        assert_eq!(state.tracking_rates, [false; 4]);
    }

    #[test]
    fn tracking_writability_from_permission() {
        let mut state = TelescopeState::default();
        state.apply(
            &mount(names::MOUNT_TRACKING)
                .with_perm(Permission::ReadOnly)
                .with_item(Item::switch(names::ON, true)),
        );
        assert_eq!(state.tracking, Some(Tracking { on: true, writable: false }));
    }

    #[test]
    fn epoch_maps_to_equatorial_system() {
        let mut state = TelescopeState::default();
        state.apply(&mount(names::MOUNT_EPOCH).with_item(Item::number(names::EPOCH, 2000.0)));
        assert_eq!(state.equatorial_system, 2);
        state.apply(&mount(names::MOUNT_EPOCH).with_item(Item::number(names::EPOCH, 0.0)));
        assert_eq!(state.equatorial_system, 1);
        state.apply(&mount(names::MOUNT_EPOCH).with_item(Item::number(names::EPOCH, 1975.0)));
        assert_eq!(state.equatorial_system, 0);
    }

    #[test]
    fn longitude_normalized_to_signed() {
        let mut state = TelescopeState::default();
        state.apply(
            &mount(names::GEOGRAPHIC_COORDINATES)
                .with_item(Item::number(names::LATITUDE, 48.1))
                .with_item(Item::number(names::LONGITUDE, 343.5))
                .with_item(Item::number(names::ELEVATION, 200.0)),
        );
        let site = state.site.unwrap();
        assert!((site.longitude - (-16.5)).abs() < 1e-9);
    }

    #[test]
    fn side_of_pier_and_alignment() {
        let mut state = TelescopeState::default();
        assert_eq!(state.alignment_mode(), 1);
        state.apply(
            &mount(names::MOUNT_SIDE_OF_PIER)
                .with_item(Item::switch(names::EAST, false))
                .with_item(Item::switch(names::WEST, true)),
        );
        assert_eq!(state.side_of_pier, Some(PierSide::West));
        assert_eq!(state.alignment_mode(), 2);
    }

    #[test]
    fn guide_ports_and_removal() {
        let mut state = TelescopeState::default();
        state.apply(
            &mount(names::GUIDER_GUIDE_RA)
                .with_state(PropertyState::Busy)
                .with_item(Item::number(names::EAST, 0.0)),
        );
        assert!(state.can_pulse_guide());
        assert!(state.is_pulse_guiding());

        state.remove(names::GUIDER_GUIDE_RA);
        assert!(!state.can_pulse_guide());
    }
}
