//! Stoplight state machine tests

use crossroad_sim::simulation::{
    ActivationArbiter, Approach, GridTopology, LightColor, SimConfig, SimStoplight, SimWorld,
    YELLOW_TICKS,
};

fn topology() -> GridTopology {
    GridTopology::new(16, 16).expect("valid grid")
}

/// Step a lone light once per entry of `cars` and record its color after each
fn run_light(
    light: &mut SimStoplight,
    arbiter: &mut ActivationArbiter,
    cars: &[usize],
) -> Vec<LightColor> {
    cars.iter()
        .map(|&waiting| {
            let decision = light.decide(waiting, arbiter).expect("decide");
            light.commit(decision);
            light.color
        })
        .collect()
}

/// Lengths of every complete run of `color` in a color history
fn run_lengths(history: &[LightColor], color: LightColor) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0;
    for c in history {
        if *c == color {
            current += 1;
        } else if current > 0 {
            runs.push(current);
            current = 0;
        }
    }
    runs
}

#[test]
fn test_light_starts_red_on_its_post() {
    let topo = topology();
    let light = SimStoplight::new(Approach::North, &topo, 8, false);
    assert_eq!(light.color, LightColor::Red);
    assert_eq!(light.position, topo.light_position(Approach::North));
    assert_eq!(light.controlled_origin(), Approach::South);
    assert_eq!(light.preview_cells(), &topo.preview_cells(Approach::South));
}

#[test]
fn test_fixed_cycle_lengths() {
    let topo = topology();
    let mut light = SimStoplight::new(Approach::East, &topo, 8, false);
    let mut arbiter = ActivationArbiter::new();

    let history = run_light(&mut light, &mut arbiter, &[0; 40]);

    assert_eq!(history[0], LightColor::Green);
    let greens = run_lengths(&history, LightColor::Green);
    let yellows = run_lengths(&history, LightColor::Yellow);
    assert!(greens.len() >= 3);
    assert_eq!(greens[0], 7);
    assert!(greens[1..].iter().all(|&len| len == 6), "greens: {:?}", greens);
    assert!(
        yellows.iter().all(|&len| len == YELLOW_TICKS as usize),
        "yellows: {:?}",
        yellows
    );
}

#[test]
fn test_counter_carries_into_red() {
    let topo = topology();
    let mut light = SimStoplight::new(Approach::East, &topo, 8, false);
    let mut arbiter = ActivationArbiter::new();

    let mut trace = Vec::new();
    for _ in 0..12 {
        let decision = light.decide(0, &mut arbiter).expect("decide");
        light.commit(decision);
        trace.push((light.color, light.ticks_in_state()));
    }

    assert_eq!(trace[0], (LightColor::Green, 0));
    assert_eq!(trace[6], (LightColor::Green, 6));
    assert_eq!(trace[7], (LightColor::Yellow, 7));
    assert_eq!(trace[8], (LightColor::Yellow, 8));
    assert_eq!(trace[9], (LightColor::Red, 1));
    // The counter is not reset when green starts again
    assert_eq!(trace[10], (LightColor::Green, 1));
    assert_eq!(trace[11], (LightColor::Green, 2));
}

#[test]
fn test_smart_light_waits_for_cars() {
    let topo = topology();
    let mut light = SimStoplight::new(Approach::South, &topo, 8, true);
    let mut arbiter = ActivationArbiter::new();

    let history = run_light(&mut light, &mut arbiter, &[0; 5]);
    assert!(history.iter().all(|c| *c == LightColor::Red));
    assert!(arbiter.is_empty());

    let history = run_light(&mut light, &mut arbiter, &[1]);
    assert_eq!(history, vec![LightColor::Green]);
    assert_eq!(arbiter.head(), Some(Approach::South));
}

#[test]
fn test_smart_light_ends_green_early_with_two_tick_yellow() {
    let topo = topology();
    let mut light = SimStoplight::new(Approach::West, &topo, 10, true);
    let mut arbiter = ActivationArbiter::new();

    // Green on tick 1, cars stay for two more ticks, then leave
    let history = run_light(&mut light, &mut arbiter, &[2, 1, 1, 0, 0, 0, 0, 0]);
    assert_eq!(
        history,
        vec![
            LightColor::Green,
            LightColor::Green,
            LightColor::Green,
            LightColor::Yellow,
            LightColor::Yellow,
            LightColor::Red,
            LightColor::Red,
            LightColor::Red,
        ]
    );
    assert!(arbiter.is_empty());
}

#[test]
fn test_yellow_releases_queue_to_next_light() {
    let topo = topology();
    let mut first = SimStoplight::new(Approach::North, &topo, 4, false);
    let mut second = SimStoplight::new(Approach::West, &topo, 4, false);
    let mut arbiter = ActivationArbiter::new();

    let mut history = Vec::new();
    for _ in 0..12 {
        let d1 = first.decide(0, &mut arbiter).expect("decide");
        let d2 = second.decide(0, &mut arbiter).expect("decide");
        first.commit(d1);
        second.commit(d2);
        history.push((first.color, second.color));
        assert!(
            !(first.color == LightColor::Green && second.color == LightColor::Green),
            "both lights green"
        );
    }

    assert_eq!(history[0], (LightColor::Green, LightColor::Red));
    assert!(history
        .iter()
        .any(|(a, b)| *a == LightColor::Red && *b == LightColor::Green));
}

#[test]
fn test_at_most_one_green_in_world() {
    let config = SimConfig {
        spawn_rate: 0.4,
        ..SimConfig::default()
    };
    let mut world = SimWorld::new_with_seed(config, 11).expect("world");

    let mut histories = vec![Vec::new(); 4];
    for _ in 0..400 {
        world.step().expect("step");
        let greens = world
            .stoplights()
            .iter()
            .filter(|l| l.color == LightColor::Green)
            .count();
        assert!(greens <= 1, "{} lights green at once", greens);
        for light in world.stoplights() {
            histories[light.id.index()].push(light.color);
        }
    }

    for history in &histories {
        let yellows = run_lengths(history, LightColor::Yellow);
        assert!(yellows.iter().all(|&len| len == 2), "yellows: {:?}", yellows);
    }
}
