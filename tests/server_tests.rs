//! Renderer protocol tests, driven without opening a socket

use std::time::Duration;

use crossroad_sim::server::{ServeStatus, SimulationServer};
use crossroad_sim::simulation::{SimConfig, SimWorld};
use serde_json::{json, Value};

fn server() -> SimulationServer {
    let config = SimConfig {
        spawn_rate: 0.5,
        ..SimConfig::default()
    };
    SimulationServer::new(SimWorld::new_with_seed(config, 21).expect("world"))
}

fn ask(server: &mut SimulationServer, request: &str) -> Value {
    let body = json!({ "request": request }).to_string();
    let reply = server
        .handle_at(&body, Duration::from_secs(1))
        .expect("reply");
    assert_eq!(reply.status, ServeStatus::Continue);
    serde_json::from_str(&reply.body).expect("reply is JSON")
}

#[test]
fn test_board_init() {
    let mut server = server();
    assert_eq!(ask(&mut server, "board-init"), json!({ "m": 16, "n": 16 }));
    assert!(!server.is_initialized());
}

#[test]
fn test_step_waits_for_lights_init() {
    let mut server = server();
    assert_eq!(ask(&mut server, "step"), json!({ "order": "wait" }));
    assert_eq!(server.world().stats().ticks, 0);
}

#[test]
fn test_lights_init() {
    let mut server = server();
    let reply = ask(&mut server, "lights-init");
    assert!(server.is_initialized());

    let items = reply["Items"].as_array().expect("Items array");
    assert_eq!(items.len(), 4);
    assert_eq!(
        items[0],
        json!({ "id": "North", "state": "red", "x": 9, "y": 6 })
    );
}

#[test]
fn test_step_reply() {
    let mut server = server();
    ask(&mut server, "lights-init");

    let mut saw_car = false;
    for tick in 1..=10 {
        let reply = ask(&mut server, "step");
        let cars: Value =
            serde_json::from_str(reply["carsJson"].as_str().expect("carsJson string"))
                .expect("cars JSON");
        let lights: Value =
            serde_json::from_str(reply["lightsJson"].as_str().expect("lightsJson string"))
                .expect("lights JSON");

        assert_eq!(lights["Items"].as_array().map(Vec::len), Some(4));
        for car in cars["Items"].as_array().expect("car items") {
            saw_car = true;
            for key in ["id", "x1", "y1", "x2", "y2", "origin", "action", "turn"] {
                assert!(car.get(key).is_some(), "missing {} in {}", key, car);
            }
        }
        assert_eq!(server.world().stats().ticks, tick);
    }
    assert!(saw_car);
}

#[test]
fn test_unknown_request_waits() {
    let mut server = server();
    assert_eq!(ask(&mut server, "dance"), json!({ "order": "wait" }));

    let reply = server
        .handle_at("not json at all", Duration::ZERO)
        .expect("reply");
    assert_eq!(reply.status, ServeStatus::Continue);
    assert_eq!(
        serde_json::from_str::<Value>(&reply.body).expect("JSON"),
        json!({ "order": "wait" })
    );
}

#[test]
fn test_deadline_stops_server() {
    let config = SimConfig {
        max_duration: Duration::from_secs(5),
        ..SimConfig::default()
    };
    let mut server = SimulationServer::new(SimWorld::new_with_seed(config, 1).expect("world"));
    ask(&mut server, "lights-init");

    let reply = server
        .handle_at(r#"{"request": "step"}"#, Duration::from_secs(5))
        .expect("reply");
    assert_eq!(reply.status, ServeStatus::Stop);
    assert_eq!(
        serde_json::from_str::<Value>(&reply.body).expect("JSON"),
        json!({ "order": "stop" })
    );
    assert_eq!(server.world().stats().ticks, 0);

    let report = server.report();
    assert!(report.deadline_reached);
}
