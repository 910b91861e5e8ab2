//! Vehicle With Parallel Alarm
//!
//! This example drives a vehicle's `state` attribute while a second machine
//! on `alarm_state` follows along in parallel.
//!
//! Key concepts:
//! - Events built from ordered transition rules
//! - Guards with an `if` predicate on the subject
//! - Parallel machines fired with the same or an explicit event name
//! - Loopback transitions and history recording
//!
//! Run with: cargo run --example vehicle_alarm

use statewise::builder::EventBuilder;
use statewise::core::{Guard, HistoryRecorder, Subject};
use statewise::engine::Machine;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Vehicle {
    state: Option<String>,
    alarm_state: Option<String>,
    seatbelt_on: bool,
}

impl Subject<String> for Vehicle {
    fn read_state(&self, attribute: &str) -> Option<String> {
        match attribute {
            "state" => self.state.clone(),
            "alarm_state" => self.alarm_state.clone(),
            _ => None,
        }
    }

    fn write_state(&mut self, attribute: &str, value: Option<String>) {
        match attribute {
            "state" => self.state = value,
            "alarm_state" => self.alarm_state = value,
            _ => {}
        }
    }
}

fn s(value: &str) -> Option<String> {
    Some(value.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Vehicle With Parallel Alarm ===\n");

    let history: Arc<HistoryRecorder<String>> = Arc::new(HistoryRecorder::new());

    // Alarm machine, fired in parallel by the vehicle's events
    let alarm: Arc<Machine<Vehicle, String>> = Arc::new(
        Machine::builder("alarm_state")
            .namespace("alarm")
            .event(EventBuilder::new("ignite").transition(s("active"), s("off")))?
            .event(EventBuilder::new("enable").transition_from_any(s("active")))?
            .observe(history.clone())
            .build(),
    );

    let vehicle_machine: Machine<Vehicle, String> = Machine::builder("state")
        .event(
            EventBuilder::new("ignite")
                .transition(s("parked"), s("idling"))
                .transition(s("stalled"), s("idling"))
                .parallel(alarm.clone(), None),
        )?
        .event(EventBuilder::new("shift_up").guarded_transition(
            s("idling"),
            s("first_gear"),
            Guard::builder().when(|v: &Vehicle| v.seatbelt_on).build(),
        ))?
        .event(
            EventBuilder::new("park")
                .transition(s("idling"), s("parked"))
                .transition(s("first_gear"), s("parked"))
                .parallel(alarm, Some("enable")),
        )?
        .observe(history.clone())
        .build();

    let mut vehicle = Vehicle {
        state: s("parked"),
        alarm_state: s("active"),
        seatbelt_on: false,
    };

    println!("Known states: {:?}", vehicle_machine.states());
    println!("Available from {:?}:", vehicle.state);
    for transition in vehicle_machine.transitions_for(&vehicle, true) {
        println!(
            "  {:?}: {:?} -> {:?}",
            transition.event(),
            transition.from(),
            transition.to()
        );
    }
    println!();

    let steps = ["ignite", "shift_up", "park"];
    for name in steps {
        let fired = vehicle_machine.fire(&mut vehicle, name);
        println!(
            "fire {name:<9} -> {fired:<5} state={:?} alarm={:?}",
            vehicle.state, vehicle.alarm_state
        );
        if !fired && name == "shift_up" {
            println!("  fastening seatbelt and retrying");
            vehicle.seatbelt_on = true;
            vehicle_machine.fire(&mut vehicle, name);
            println!("  state={:?}", vehicle.state);
        }
    }

    let recorded = history.snapshot();
    println!("\nPath of state:       {:?}", recorded.get_path("state"));
    println!("Path of alarm_state: {:?}", recorded.get_path("alarm_state"));
    println!("\nHistory as JSON:\n{}", history.to_json()?);

    println!("\n=== Example Complete ===");
    Ok(())
}
