//! Command dispatch scenarios against a recording bus.
//!
//! Bus state is fed through `Bridge::handle_event` exactly as the ingestion
//! loop would, and the `MockBus` records every mutation a command issues.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use alpaca_bridge::hal::MockBus;
use alpaca_bridge::names;
use alpaca_bridge::{
    AlpacaError, Bridge, BridgeConfig, BusEvent, ChangeValue, DeviceHandle, DeviceType, Item,
    Params, Permission, Property, PropertyState, WaitConfig,
};

fn test_bridge() -> Bridge<MockBus> {
    let waits = WaitConfig::default()
        .with_poll_interval(Duration::from_millis(5))
        .with_short_timeout(Duration::from_millis(200))
        .with_slew_timeout(Duration::from_secs(2));
    Bridge::new(MockBus::new(), BridgeConfig::default().with_waits(waits))
}

fn announce(bridge: &Bridge<MockBus>, device: &str, interface: u64, connected: bool) {
    bridge.handle_event(BusEvent::Define(
        Property::new(device, names::INFO)
            .with_item(Item::text(names::DEVICE_INTERFACE, interface.to_string())),
    ));
    bridge.handle_event(BusEvent::Update(
        Property::new(device, names::CONNECTION)
            .with_item(Item::switch(names::CONNECTED, connected))
            .with_item(Item::switch(names::DISCONNECTED, !connected)),
    ));
}

fn define(bridge: &Bridge<MockBus>, property: Property) {
    bridge.handle_event(BusEvent::Define(property));
}

fn handle(bridge: &Bridge<MockBus>, device_type: DeviceType) -> Arc<DeviceHandle> {
    bridge.device(device_type, 0).unwrap()
}

/// Deliver `property` as a bus update shortly after the command starts waiting.
fn update_later(bridge: &Arc<Bridge<MockBus>>, property: Property) -> tokio::task::JoinHandle<()> {
    let bridge = Arc::clone(bridge);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        bridge.handle_event(BusEvent::Update(property));
    })
}

// ============================================================================
// Connection precondition
// ============================================================================

#[tokio::test]
async fn test_every_type_requires_connection() {
    let bridge = test_bridge();
    let devices = [
        ("Mount", names::INTERFACE_MOUNT, DeviceType::Telescope, "tracking"),
        ("Dome", names::INTERFACE_DOME, DeviceType::Dome, "slewing"),
        ("Focuser", names::INTERFACE_FOCUSER, DeviceType::Focuser, "ismoving"),
        ("Rotator", names::INTERFACE_ROTATOR, DeviceType::Rotator, "ismoving"),
        ("Wheel", names::INTERFACE_WHEEL, DeviceType::FilterWheel, "position"),
        ("Powerbox", names::INTERFACE_AUX_POWERBOX, DeviceType::Switch, "maxswitch"),
        ("Flat", names::INTERFACE_AUX_LIGHTBOX, DeviceType::CoverCalibrator, "coverstate"),
    ];

    for (device, interface, device_type, command) in devices {
        announce(&bridge, device, interface, false);
        let device = handle(&bridge, device_type);

        assert_eq!(
            bridge.get_command(&device, command, &Params::new()),
            Err(AlpacaError::NotConnected),
            "{} {}",
            device_type.as_str(),
            command
        );
        // Identity still answers while disconnected
        assert!(bridge.get_command(&device, "name", &Params::new()).is_ok());
    }
}

#[tokio::test]
async fn test_unknown_command_after_connection_check() {
    let bridge = test_bridge();
    announce(&bridge, "Focuser", names::INTERFACE_FOCUSER, true);
    let focuser = handle(&bridge, DeviceType::Focuser);

    assert_eq!(
        bridge.get_command(&focuser, "warpfactor", &Params::new()),
        Err(AlpacaError::NotImplemented)
    );
    assert_eq!(
        bridge.set_command(&focuser, "warpfactor", &Params::new()).await,
        Err(AlpacaError::NotImplemented)
    );
}

#[tokio::test]
async fn test_unsupported_commands_check_connection_first() {
    let bridge = test_bridge();
    announce(&bridge, "Focuser", names::INTERFACE_FOCUSER, false);
    announce(&bridge, "Rotator", names::INTERFACE_ROTATOR, false);
    announce(&bridge, "Flat", names::INTERFACE_AUX_LIGHTBOX, false);
    let focuser = handle(&bridge, DeviceType::Focuser);
    let rotator = handle(&bridge, DeviceType::Rotator);
    let flat = handle(&bridge, DeviceType::CoverCalibrator);

    assert_eq!(
        bridge.get_command(&focuser, "stepsize", &Params::new()),
        Err(AlpacaError::NotConnected)
    );
    assert_eq!(
        bridge.get_command(&rotator, "stepsize", &Params::new()),
        Err(AlpacaError::NotConnected)
    );
    assert_eq!(
        bridge.set_command(&flat, "haltcover", &Params::new()).await,
        Err(AlpacaError::NotConnected)
    );
    assert_eq!(
        bridge.set_command(&focuser, "warpfactor", &Params::new()).await,
        Err(AlpacaError::NotConnected)
    );

    announce(&bridge, "Focuser", names::INTERFACE_FOCUSER, true);
    announce(&bridge, "Flat", names::INTERFACE_AUX_LIGHTBOX, true);
    assert_eq!(
        bridge.get_command(&focuser, "stepsize", &Params::new()),
        Err(AlpacaError::NotImplemented)
    );
    assert_eq!(
        bridge.set_command(&flat, "haltcover", &Params::new()).await,
        Err(AlpacaError::NotImplemented)
    );
}

#[tokio::test]
async fn test_switch_names_check_connection_before_id() {
    let bridge = test_bridge();
    announce(&bridge, "Powerbox", names::INTERFACE_AUX_POWERBOX, false);
    let switch = handle(&bridge, DeviceType::Switch);

    // No Id at all: the connection is still reported first
    for command in ["getswitchname", "getswitchdescription", "getswitchvalue"] {
        assert_eq!(
            bridge.get_command(&switch, command, &Params::new()),
            Err(AlpacaError::NotConnected),
            "{}",
            command
        );
    }
}

#[tokio::test]
async fn test_setters_require_connection() {
    let bridge = test_bridge();
    let commands = [
        ("Mount", names::INTERFACE_MOUNT, DeviceType::Telescope, "abortslew", Params::new()),
        ("Dome", names::INTERFACE_DOME, DeviceType::Dome, "openshutter", Params::new()),
        (
            "Focuser",
            names::INTERFACE_FOCUSER,
            DeviceType::Focuser,
            "move",
            Params::new().with("Position", "100"),
        ),
        ("Rotator", names::INTERFACE_ROTATOR, DeviceType::Rotator, "halt", Params::new()),
        (
            "Wheel",
            names::INTERFACE_WHEEL,
            DeviceType::FilterWheel,
            "position",
            Params::new().with("Position", "1"),
        ),
        (
            "Powerbox",
            names::INTERFACE_AUX_POWERBOX,
            DeviceType::Switch,
            "setswitch",
            Params::new().with("Id", "0").with("State", "true"),
        ),
        ("Flat", names::INTERFACE_AUX_LIGHTBOX, DeviceType::CoverCalibrator, "opencover", Params::new()),
    ];

    for (device, interface, device_type, command, params) in commands {
        announce(&bridge, device, interface, false);
        let device = handle(&bridge, device_type);
        assert_eq!(
            bridge.set_command(&device, command, &params).await,
            Err(AlpacaError::NotConnected),
            "{} {}",
            device_type.as_str(),
            command
        );
    }
    assert_eq!(bridge.bus().call_count(), 0);
}

// ============================================================================
// Dome
// ============================================================================

fn dome_with_goto(bridge: &Bridge<MockBus>, parked: bool) -> Arc<DeviceHandle> {
    announce(bridge, "Dome", names::INTERFACE_DOME, true);
    define(
        bridge,
        Property::new("Dome", names::DOME_HORIZONTAL_COORDINATES)
            .with_item(Item::number_in(names::AZ, 90.0, 0.0, 360.0, 0.1)),
    );
    define(
        bridge,
        Property::new("Dome", names::DOME_ON_HORIZONTAL_COORDINATES_SET)
            .with_item(Item::switch(names::GOTO, true))
            .with_item(Item::switch(names::SYNC, false)),
    );
    define(
        bridge,
        Property::new("Dome", names::DOME_PARK)
            .with_item(Item::switch(names::PARKED, parked))
            .with_item(Item::switch(names::UNPARKED, !parked)),
    );
    handle(bridge, DeviceType::Dome)
}

#[tokio::test]
async fn test_dome_slew_azimuth_range() {
    let bridge = test_bridge();
    let dome = dome_with_goto(&bridge, false);

    for az in ["360", "-1", "north"] {
        let params = Params::new().with("Azimuth", az);
        assert_eq!(
            bridge.set_command(&dome, "slewtoazimuth", &params).await,
            Err(AlpacaError::InvalidValue),
            "azimuth {}",
            az
        );
    }
    assert_eq!(bridge.bus().call_count(), 0);

    let params = Params::new().with("Azimuth", "180");
    assert_eq!(bridge.set_command(&dome, "slewtoazimuth", &params).await, Ok(()));
    assert_eq!(bridge.get_command(&dome, "slewing", &Params::new()), Ok(json!(true)));

    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.property, names::DOME_HORIZONTAL_COORDINATES);
    assert_eq!(change.items, vec![(names::AZ.to_string(), alpaca_bridge::ChangeValue::Number(180.0))]);
}

#[tokio::test]
async fn test_dome_slew_needs_writable_azimuth() {
    let bridge = test_bridge();
    let dome = dome_with_goto(&bridge, false);
    define(
        &bridge,
        Property::new("Dome", names::DOME_HORIZONTAL_COORDINATES)
            .with_perm(Permission::ReadOnly)
            .with_item(Item::number(names::AZ, 90.0)),
    );

    assert_eq!(bridge.get_command(&dome, "cansetazimuth", &Params::new()), Ok(json!(false)));
    let params = Params::new().with("Azimuth", "360");
    assert_eq!(
        bridge.set_command(&dome, "slewtoazimuth", &params).await,
        Err(AlpacaError::NotImplemented)
    );
}

#[tokio::test]
async fn test_dome_slew_unparks_first() {
    let bridge = test_bridge();
    let dome = dome_with_goto(&bridge, true);

    let params = Params::new().with("Azimuth", "45");
    assert_eq!(bridge.set_command(&dome, "slewtoazimuth", &params).await, Ok(()));

    let changes = bridge.bus().changes();
    assert_eq!(changes[0].property, names::DOME_PARK);
    assert_eq!(changes[0].items[0].0, names::UNPARKED);
    assert_eq!(bridge.get_command(&dome, "atpark", &Params::new()), Ok(json!(false)));
}

#[tokio::test]
async fn test_dome_slaved_rejects_slew() {
    let bridge = test_bridge();
    let dome = dome_with_goto(&bridge, false);
    define(
        &bridge,
        Property::new("Dome", names::DOME_SLAVING)
            .with_item(Item::switch(names::ENABLED, true))
            .with_item(Item::switch(names::DISABLED, false)),
    );

    let params = Params::new().with("Azimuth", "45");
    assert_eq!(
        bridge.set_command(&dome, "slewtoazimuth", &params).await,
        Err(AlpacaError::InvalidWhileSlaved)
    );
}

#[tokio::test]
async fn test_open_shutter_when_open_is_noop() {
    let bridge = test_bridge();
    announce(&bridge, "Dome", names::INTERFACE_DOME, true);
    define(
        &bridge,
        Property::new("Dome", names::DOME_SHUTTER)
            .with_item(Item::switch(names::OPENED, true))
            .with_item(Item::switch(names::CLOSED, false)),
    );
    let dome = handle(&bridge, DeviceType::Dome);

    assert_eq!(bridge.set_command(&dome, "openshutter", &Params::new()).await, Ok(()));
    assert_eq!(bridge.bus().call_count(), 0);

    assert_eq!(bridge.set_command(&dome, "closeshutter", &Params::new()).await, Ok(()));
    assert_eq!(bridge.bus().call_count(), 1);
    assert_eq!(bridge.get_command(&dome, "shutterstatus", &Params::new()), Ok(json!(3)));
}

#[tokio::test]
async fn test_capability_survives_unrelated_update() {
    let bridge = test_bridge();
    let dome = dome_with_goto(&bridge, false);

    bridge.handle_event(BusEvent::Update(
        Property::new("Dome", names::DOME_SHUTTER)
            .with_state(PropertyState::Busy)
            .with_item(Item::switch(names::OPENED, true))
            .with_item(Item::switch(names::CLOSED, false)),
    ));

    assert_eq!(bridge.get_command(&dome, "cansetazimuth", &Params::new()), Ok(json!(true)));
    assert_eq!(bridge.get_command(&dome, "canpark", &Params::new()), Ok(json!(true)));
    assert_eq!(bridge.get_command(&dome, "shutterstatus", &Params::new()), Ok(json!(2)));
}

#[tokio::test]
async fn test_dome_slaved_reached_is_ok() {
    let bridge = Arc::new(test_bridge());
    let dome = dome_with_goto(&bridge, false);
    define(
        &bridge,
        Property::new("Dome", names::DOME_SLAVING)
            .with_item(Item::switch(names::ENABLED, false))
            .with_item(Item::switch(names::DISABLED, true)),
    );

    let echo = update_later(
        &bridge,
        Property::new("Dome", names::DOME_SLAVING)
            .with_item(Item::switch(names::ENABLED, true))
            .with_item(Item::switch(names::DISABLED, false)),
    );
    let params = Params::new().with("Slaved", "true");
    assert_eq!(bridge.set_command(&dome, "slaved", &params).await, Ok(()));
    echo.await.unwrap();

    assert_eq!(bridge.get_command(&dome, "slaved", &Params::new()), Ok(json!(true)));
    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.property, names::DOME_SLAVING);
    assert_eq!(change.value(names::ENABLED), Some(&ChangeValue::Switch(true)));
}

// ============================================================================
// Telescope
// ============================================================================

fn mount(bridge: &Bridge<MockBus>, parked: bool) -> Arc<DeviceHandle> {
    announce(bridge, "Mount", names::INTERFACE_MOUNT, true);
    define(
        bridge,
        Property::new("Mount", names::MOUNT_ON_COORDINATES_SET)
            .with_item(Item::switch(names::TRACK, true))
            .with_item(Item::switch(names::SYNC, false)),
    );
    define(
        bridge,
        Property::new("Mount", names::MOUNT_PARK)
            .with_item(Item::switch(names::PARKED, parked))
            .with_item(Item::switch(names::UNPARKED, !parked)),
    );
    define(
        bridge,
        Property::new("Mount", names::MOUNT_EQUATORIAL_COORDINATES)
            .with_item(Item::number(names::RA, 1.0))
            .with_item(Item::number(names::DEC, 20.0)),
    );
    define(
        bridge,
        Property::new("Mount", names::MOUNT_TRACKING)
            .with_item(Item::switch(names::ON, false))
            .with_item(Item::switch(names::OFF, true)),
    );
    handle(bridge, DeviceType::Telescope)
}

#[tokio::test]
async fn test_parked_check_precedes_range_check() {
    let bridge = test_bridge();
    let telescope = mount(&bridge, true);

    let params = Params::new()
        .with("RightAscension", "99")
        .with("Declination", "-200");
    assert_eq!(
        bridge.set_command(&telescope, "slewtocoordinatesasync", &params).await,
        Err(AlpacaError::InvalidWhileParked)
    );
    assert_eq!(bridge.bus().call_count(), 0);
}

#[tokio::test]
async fn test_unset_target_reads_value_not_set() {
    let bridge = test_bridge();
    let telescope = mount(&bridge, false);

    assert_eq!(
        bridge.get_command(&telescope, "targetdeclination", &Params::new()),
        Err(AlpacaError::ValueNotSet)
    );
}

#[tokio::test]
async fn test_slew_to_target_waits_for_settle() {
    let bridge = Arc::new(test_bridge());
    let telescope = mount(&bridge, false);

    assert_eq!(
        bridge.set_command(&telescope, "slewtotarget", &Params::new()).await,
        Err(AlpacaError::InvalidOperation)
    );

    let dec = Params::new().with("TargetDeclination", "10");
    let ra = Params::new().with("TargetRightAscension", "5");
    assert_eq!(bridge.set_command(&telescope, "targetdeclination", &dec).await, Ok(()));
    assert_eq!(bridge.set_command(&telescope, "targetrightascension", &ra).await, Ok(()));

    let settle = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            bridge.handle_event(BusEvent::Update(
                Property::new("Mount", names::MOUNT_EQUATORIAL_COORDINATES)
                    .with_item(Item::number(names::RA, 5.0))
                    .with_item(Item::number(names::DEC, 10.0)),
            ));
        })
    };

    assert_eq!(bridge.set_command(&telescope, "slewtotarget", &Params::new()).await, Ok(()));
    settle.await.unwrap();

    assert_eq!(bridge.get_command(&telescope, "slewing", &Params::new()), Ok(json!(false)));
    assert_eq!(bridge.get_command(&telescope, "rightascension", &Params::new()), Ok(json!(5.0)));

    let slews = bridge.bus().changes_to(names::MOUNT_EQUATORIAL_COORDINATES);
    assert_eq!(slews.len(), 1);
}

#[tokio::test]
async fn test_wait_timeout_is_invalid_operation() {
    let bridge = test_bridge();
    let telescope = mount(&bridge, false);

    // The bus never confirms the tracking change
    let params = Params::new().with("Tracking", "true");
    assert_eq!(
        bridge.set_command(&telescope, "tracking", &params).await,
        Err(AlpacaError::InvalidOperation)
    );
    assert_eq!(bridge.bus().changes_to(names::MOUNT_TRACKING).len(), 1);
}

#[tokio::test]
async fn test_bus_failure_is_invalid_operation() {
    let bridge = test_bridge();
    let telescope = mount(&bridge, false);
    bridge.bus().set_failing(true);

    let params = Params::new()
        .with("RightAscension", "3")
        .with("Declination", "45");
    assert_eq!(
        bridge.set_command(&telescope, "slewtocoordinatesasync", &params).await,
        Err(AlpacaError::InvalidOperation)
    );
}

#[tokio::test]
async fn test_rejected_coordinates_leave_mount_idle() {
    let bridge = test_bridge();
    let telescope = mount(&bridge, false);
    bridge.bus().reject_property(Some(names::MOUNT_EQUATORIAL_COORDINATES));

    let params = Params::new()
        .with("RightAscension", "3")
        .with("Declination", "45");
    assert_eq!(
        bridge.set_command(&telescope, "slewtocoordinatesasync", &params).await,
        Err(AlpacaError::InvalidOperation)
    );

    // The TRACK selection went out, the coordinates did not
    assert_eq!(bridge.bus().changes_to(names::MOUNT_ON_COORDINATES_SET).len(), 1);
    assert_eq!(bridge.get_command(&telescope, "slewing", &Params::new()), Ok(json!(false)));
}

// ============================================================================
// Rotator
// ============================================================================

#[tokio::test]
async fn test_rotator_move_while_moving() {
    let bridge = test_bridge();
    announce(&bridge, "Rotator", names::INTERFACE_ROTATOR, true);
    define(
        &bridge,
        Property::new("Rotator", names::ROTATOR_POSITION)
            .with_state(PropertyState::Busy)
            .with_item(Item::number_in(names::POSITION, 10.0, 0.0, 360.0, 0.1)),
    );
    let rotator = handle(&bridge, DeviceType::Rotator);

    let params = Params::new().with("Position", "30");
    assert_eq!(
        bridge.set_command(&rotator, "move", &params).await,
        Err(AlpacaError::InvalidOperation)
    );
    assert_eq!(bridge.bus().call_count(), 0);
}

#[tokio::test]
async fn test_rotator_relative_move_wraps() {
    let bridge = test_bridge();
    announce(&bridge, "Rotator", names::INTERFACE_ROTATOR, true);
    define(
        &bridge,
        Property::new("Rotator", names::ROTATOR_POSITION)
            .with_item(Item::number_in(names::POSITION, 350.0, 0.0, 360.0, 0.1)),
    );
    let rotator = handle(&bridge, DeviceType::Rotator);

    let params = Params::new().with("Position", "20");
    assert_eq!(bridge.set_command(&rotator, "move", &params).await, Ok(()));
    assert_eq!(bridge.get_command(&rotator, "targetposition", &Params::new()), Ok(json!(10.0)));
}

// ============================================================================
// Switch
// ============================================================================

fn panel(bridge: &Bridge<MockBus>) -> Arc<DeviceHandle> {
    announce(bridge, "Powerbox", names::INTERFACE_AUX_POWERBOX | names::INTERFACE_AUX_GPIO, true);

    let mut power = Property::new("Powerbox", names::AUX_POWER_OUTLET);
    for n in 1..=3 {
        power = power.with_item(Item::switch(format!("OUTLET_{}", n), false));
    }
    let mut heater = Property::new("Powerbox", names::AUX_HEATER_OUTLET);
    for n in 1..=2 {
        heater = heater.with_item(Item::number_in(format!("OUTLET_{}", n), 0.0, 0.0, 100.0, 1.0));
    }
    let mut gpio = Property::new("Powerbox", names::AUX_GPIO_OUTLET);
    for n in 1..=4 {
        gpio = gpio.with_item(Item::switch(format!("OUTLET_{}", n), false).with_label(format!("Relay {}", n)));
    }
    let sensors = Property::new("Powerbox", names::AUX_GPIO_SENSORS)
        .with_item(Item::number_in("SENSOR_1", 512.0, 0.0, 1023.0, 1.0));

    for property in [power, heater, gpio, sensors] {
        define(bridge, property);
    }
    handle(bridge, DeviceType::Switch)
}

#[tokio::test]
async fn test_switch_id_decomposition() {
    let bridge = test_bridge();
    let switch = panel(&bridge);

    assert_eq!(bridge.get_command(&switch, "maxswitch", &Params::new()), Ok(json!(10)));

    let five = Params::new().with("Id", "5");
    assert_eq!(
        bridge.get_command(&switch, "getswitchname", &five),
        Ok(json!("Relay 1"))
    );
    assert_eq!(bridge.get_command(&switch, "canwrite", &five), Ok(json!(true)));

    let nine = Params::new().with("Id", "9");
    assert_eq!(bridge.get_command(&switch, "canwrite", &nine), Ok(json!(false)));
    assert_eq!(bridge.get_command(&switch, "getswitchvalue", &nine), Ok(json!(512.0)));
    assert_eq!(
        bridge
            .set_command(&switch, "setswitch", &nine.clone().with("State", "true"))
            .await,
        Err(AlpacaError::NotImplemented)
    );

    let ten = Params::new().with("Id", "10");
    assert_eq!(
        bridge.get_command(&switch, "getswitchvalue", &ten),
        Err(AlpacaError::InvalidValue)
    );
}

#[tokio::test]
async fn test_setswitch_targets_gpio_item() {
    let bridge = test_bridge();
    let switch = panel(&bridge);

    // Unconfirmed writes time out, but the mutation is still issued
    let params = Params::new().with("Id", "6").with("State", "true");
    assert_eq!(
        bridge.set_command(&switch, "setswitch", &params).await,
        Err(AlpacaError::InvalidOperation)
    );

    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.property, names::AUX_GPIO_OUTLET);
    assert_eq!(change.items[0].0, "OUTLET_2");
}

#[tokio::test]
async fn test_switch_value_settles_on_step() {
    let bridge = Arc::new(test_bridge());
    let switch = panel(&bridge);

    // Heater OUTLET_1 is id 3 with step 1; the driver rounds the request
    let echo = update_later(
        &bridge,
        Property::new("Powerbox", names::AUX_HEATER_OUTLET)
            .with_item(Item::number_in("OUTLET_1", 33.0, 0.0, 100.0, 1.0))
            .with_item(Item::number_in("OUTLET_2", 0.0, 0.0, 100.0, 1.0)),
    );
    let params = Params::new().with("Id", "3").with("Value", "33.3");
    assert_eq!(bridge.set_command(&switch, "setswitchvalue", &params).await, Ok(()));
    echo.await.unwrap();

    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.value("OUTLET_1"), Some(&ChangeValue::Number(33.3)));
    assert_eq!(
        bridge.get_command(&switch, "getswitchvalue", &Params::new().with("Id", "3")),
        Ok(json!(33.0))
    );
}

#[tokio::test]
async fn test_switch_value_off_by_a_step_times_out() {
    let bridge = Arc::new(test_bridge());
    let switch = panel(&bridge);

    let echo = update_later(
        &bridge,
        Property::new("Powerbox", names::AUX_HEATER_OUTLET)
            .with_item(Item::number_in("OUTLET_1", 32.0, 0.0, 100.0, 1.0))
            .with_item(Item::number_in("OUTLET_2", 0.0, 0.0, 100.0, 1.0)),
    );
    let params = Params::new().with("Id", "3").with("Value", "33.3");
    assert_eq!(
        bridge.set_command(&switch, "setswitchvalue", &params).await,
        Err(AlpacaError::InvalidOperation)
    );
    echo.await.unwrap();
}

// ============================================================================
// Filter wheel
// ============================================================================

#[tokio::test]
async fn test_filter_wheel_position_is_one_based_on_bus() {
    let bridge = test_bridge();
    announce(&bridge, "Wheel", names::INTERFACE_WHEEL, true);
    define(
        &bridge,
        Property::new("Wheel", names::WHEEL_SLOT)
            .with_item(Item::number_in(names::SLOT, 1.0, 1.0, 5.0, 1.0)),
    );
    let wheel = handle(&bridge, DeviceType::FilterWheel);

    let out_of_range = Params::new().with("Position", "5");
    assert_eq!(
        bridge.set_command(&wheel, "position", &out_of_range).await,
        Err(AlpacaError::InvalidValue)
    );

    let params = Params::new().with("Position", "2");
    assert_eq!(bridge.set_command(&wheel, "position", &params).await, Ok(()));
    assert_eq!(bridge.get_command(&wheel, "position", &Params::new()), Ok(json!(-1)));

    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.value(names::SLOT), Some(&ChangeValue::Number(3.0)));
}

// ============================================================================
// Focuser
// ============================================================================

fn absolute_focuser(bridge: &Bridge<MockBus>, min: f64, max: f64) -> Arc<DeviceHandle> {
    announce(bridge, "Focuser", names::INTERFACE_FOCUSER, true);
    define(
        bridge,
        Property::new("Focuser", names::FOCUSER_POSITION)
            .with_item(Item::number_in(names::POSITION, min, min, max, 1.0)),
    );
    define(
        bridge,
        Property::new("Focuser", names::FOCUSER_ON_POSITION_SET)
            .with_item(Item::switch(names::GOTO, true))
            .with_item(Item::switch(names::SYNC, false)),
    );
    handle(bridge, DeviceType::Focuser)
}

fn relative_focuser(bridge: &Bridge<MockBus>, max_steps: f64) -> Arc<DeviceHandle> {
    announce(bridge, "Focuser", names::INTERFACE_FOCUSER, true);
    define(
        bridge,
        Property::new("Focuser", names::FOCUSER_POSITION)
            .with_perm(Permission::ReadOnly)
            .with_item(Item::number(names::POSITION, 0.0)),
    );
    define(
        bridge,
        Property::new("Focuser", names::FOCUSER_STEPS)
            .with_item(Item::number_in(names::STEPS, 0.0, 0.0, max_steps, 1.0)),
    );
    handle(bridge, DeviceType::Focuser)
}

#[tokio::test]
async fn test_focuser_absolute_move_clamps_to_range() {
    let bridge = test_bridge();
    let focuser = absolute_focuser(&bridge, 1000.0, 11000.0);

    let params = Params::new().with("Position", "20000");
    assert_eq!(bridge.set_command(&focuser, "move", &params).await, Ok(()));
    assert_eq!(bridge.get_command(&focuser, "ismoving", &Params::new()), Ok(json!(true)));

    let params = Params::new().with("Position", "-50");
    assert_eq!(bridge.set_command(&focuser, "move", &params).await, Ok(()));

    let moves = bridge.bus().changes_to(names::FOCUSER_POSITION);
    assert_eq!(moves.len(), 2);
    // Positions are sent back in bus units, offset by the item minimum
    assert_eq!(moves[0].value(names::POSITION), Some(&ChangeValue::Number(11000.0)));
    assert_eq!(moves[1].value(names::POSITION), Some(&ChangeValue::Number(1000.0)));
    assert_eq!(bridge.bus().changes_to(names::FOCUSER_ON_POSITION_SET).len(), 2);
}

#[tokio::test]
async fn test_focuser_relative_move_clamps_increment() {
    let bridge = test_bridge();
    let focuser = relative_focuser(&bridge, 2000.0);

    assert_eq!(bridge.get_command(&focuser, "absolute", &Params::new()), Ok(json!(false)));
    assert_eq!(bridge.get_command(&focuser, "maxincrement", &Params::new()), Ok(json!(2000)));

    let params = Params::new().with("Position", "-5000");
    assert_eq!(bridge.set_command(&focuser, "move", &params).await, Ok(()));

    let direction = bridge.bus().changes_to(names::FOCUSER_DIRECTION);
    assert_eq!(direction[0].value(names::MOVE_INWARD), Some(&ChangeValue::Switch(true)));
    let steps = bridge.bus().changes_to(names::FOCUSER_STEPS);
    assert_eq!(steps[0].value(names::STEPS), Some(&ChangeValue::Number(2000.0)));

    bridge.bus().clear();
    let params = Params::new().with("Position", "0");
    assert_eq!(bridge.set_command(&focuser, "move", &params).await, Ok(()));
    assert_eq!(bridge.bus().call_count(), 0);
}

#[tokio::test]
async fn test_focuser_negative_limits() {
    let bridge = test_bridge();
    let focuser = absolute_focuser(&bridge, 0.0, -5.0);

    let params = Params::new().with("Position", "3");
    assert_eq!(bridge.set_command(&focuser, "move", &params).await, Ok(()));
    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.value(names::POSITION), Some(&ChangeValue::Number(0.0)));

    let bridge = test_bridge();
    let focuser = relative_focuser(&bridge, -5.0);
    assert_eq!(
        bridge.set_command(&focuser, "move", &params).await,
        Err(AlpacaError::NotImplemented)
    );
    assert_eq!(bridge.bus().call_count(), 0);
}

#[tokio::test]
async fn test_focuser_temperature_compensation() {
    let bridge = Arc::new(test_bridge());
    let focuser = absolute_focuser(&bridge, 0.0, 10000.0);

    let params = Params::new().with("TempComp", "true");
    assert_eq!(
        bridge.set_command(&focuser, "tempcomp", &params).await,
        Err(AlpacaError::NotImplemented)
    );

    define(
        &bridge,
        Property::new("Focuser", names::FOCUSER_MODE)
            .with_item(Item::switch(names::AUTOMATIC, false))
            .with_item(Item::switch(names::MANUAL, true)),
    );
    assert_eq!(
        bridge.get_command(&focuser, "tempcompavailable", &Params::new()),
        Ok(json!(true))
    );

    let echo = update_later(
        &bridge,
        Property::new("Focuser", names::FOCUSER_MODE)
            .with_item(Item::switch(names::AUTOMATIC, true))
            .with_item(Item::switch(names::MANUAL, false)),
    );
    assert_eq!(bridge.set_command(&focuser, "tempcomp", &params).await, Ok(()));
    echo.await.unwrap();
    assert_eq!(bridge.get_command(&focuser, "tempcomp", &Params::new()), Ok(json!(true)));

    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.property, names::FOCUSER_MODE);
    assert_eq!(change.value(names::AUTOMATIC), Some(&ChangeValue::Switch(true)));

    // Compensation owns the position
    bridge.bus().clear();
    let params = Params::new().with("Position", "100");
    assert_eq!(
        bridge.set_command(&focuser, "move", &params).await,
        Err(AlpacaError::InvalidOperation)
    );
    assert_eq!(bridge.bus().call_count(), 0);
}

// ============================================================================
// Cover calibrator
// ============================================================================

fn flat_panel(bridge: &Bridge<MockBus>) -> Arc<DeviceHandle> {
    announce(bridge, "Flat", names::INTERFACE_AUX_LIGHTBOX, true);
    define(
        bridge,
        Property::new("Flat", names::AUX_COVER)
            .with_item(Item::switch(names::OPEN, false))
            .with_item(Item::switch(names::CLOSE, true)),
    );
    define(bridge, light_switch(false));
    define(bridge, intensity(0.0));
    handle(bridge, DeviceType::CoverCalibrator)
}

fn light_switch(on: bool) -> Property {
    Property::new("Flat", names::AUX_LIGHT_SWITCH)
        .with_item(Item::switch(names::ON, on))
        .with_item(Item::switch(names::OFF, !on))
}

fn intensity(value: f64) -> Property {
    Property::new("Flat", names::AUX_LIGHT_INTENSITY)
        .with_item(Item::number_in(names::LIGHT_INTENSITY, value, 0.0, 255.0, 1.0))
}

#[tokio::test]
async fn test_cover_open_and_close() {
    let bridge = test_bridge();
    let flat = flat_panel(&bridge);

    assert_eq!(bridge.get_command(&flat, "coverstate", &Params::new()), Ok(json!(1)));
    assert_eq!(bridge.set_command(&flat, "closecover", &Params::new()).await, Ok(()));
    assert_eq!(bridge.bus().call_count(), 0);

    assert_eq!(bridge.set_command(&flat, "opencover", &Params::new()).await, Ok(()));
    assert_eq!(bridge.get_command(&flat, "coverstate", &Params::new()), Ok(json!(2)));
    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.property, names::AUX_COVER);
    assert_eq!(change.value(names::OPEN), Some(&ChangeValue::Switch(true)));

    bridge.handle_event(BusEvent::Update(
        Property::new("Flat", names::AUX_COVER)
            .with_item(Item::switch(names::OPEN, true))
            .with_item(Item::switch(names::CLOSE, false)),
    ));
    assert_eq!(bridge.get_command(&flat, "coverstate", &Params::new()), Ok(json!(3)));

    assert_eq!(bridge.set_command(&flat, "closecover", &Params::new()).await, Ok(()));
    let change = bridge.bus().last_change().unwrap();
    assert_eq!(change.value(names::CLOSE), Some(&ChangeValue::Switch(true)));
}

#[tokio::test]
async fn test_calibrator_brightness_range() {
    let bridge = test_bridge();
    let flat = flat_panel(&bridge);

    assert_eq!(bridge.get_command(&flat, "maxbrightness", &Params::new()), Ok(json!(255)));
    for brightness in ["256", "-1", "bright"] {
        let params = Params::new().with("Brightness", brightness);
        assert_eq!(
            bridge.set_command(&flat, "calibratoron", &params).await,
            Err(AlpacaError::InvalidValue),
            "{}",
            brightness
        );
    }
    assert_eq!(bridge.bus().call_count(), 0);
}

#[tokio::test]
async fn test_calibrator_on_and_off() {
    let bridge = Arc::new(test_bridge());
    let flat = flat_panel(&bridge);

    let echo = {
        let bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            bridge.handle_event(BusEvent::Update(intensity(128.0)));
            bridge.handle_event(BusEvent::Update(light_switch(true)));
        })
    };
    let params = Params::new().with("Brightness", "128");
    assert_eq!(bridge.set_command(&flat, "calibratoron", &params).await, Ok(()));
    echo.await.unwrap();

    let levels = bridge.bus().changes_to(names::AUX_LIGHT_INTENSITY);
    assert_eq!(levels[0].value(names::LIGHT_INTENSITY), Some(&ChangeValue::Number(128.0)));
    assert_eq!(bridge.get_command(&flat, "brightness", &Params::new()), Ok(json!(128)));

    let echo = update_later(&bridge, light_switch(false));
    assert_eq!(bridge.set_command(&flat, "calibratoroff", &Params::new()).await, Ok(()));
    echo.await.unwrap();
    assert_eq!(bridge.get_command(&flat, "brightness", &Params::new()), Ok(json!(0)));
}
