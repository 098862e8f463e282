use boid_flock::flocking_rules::cohesion::Cohesion;
use boid_flock::*;

fn spawn(x: f64, y: f64, size_class: u32) -> AgentSpawn {
    AgentSpawn {
        position: Point::new(x, y),
        velocity: Vec2f::zeros(),
        size_class,
    }
}

fn seeded_flock(config: &FlockConfig, seed: u64) -> Simulation {
    let mut simulation = Simulation::new(*config).unwrap();
    let mut spawn_config = config.flock;
    spawn_config.seed = Some(seed);
    simulation
        .spawn(&mut RandomFlock::from_config(&spawn_config))
        .unwrap();
    simulation
}

fn flock_config() -> FlockConfig {
    let mut config = FlockConfig::default();
    config.world_width = 200f64;
    config.world_height = 150f64;
    config.flock.size = 300;
    config
}

#[test]
fn test_cohesion_pulls_pair_together() {
    let config = FlockConfig::default();
    let mut simulation = Simulation::new(config)
        .unwrap()
        .with_rules(vec![Box::new(Cohesion::new(
            config.perception_range,
            config.cohesion_strength,
        ))]);
    simulation
        .add_agents(&[spawn(50f64, 50f64, 2), spawn(55f64, 50f64, 2)])
        .unwrap();

    let mut distance = 5f64;
    for _ in 0..6 {
        simulation.step(&mut |_: &[Agent]| {}).unwrap();
        let agents = simulation.agents();
        let next = (agents[0].position - agents[1].position).norm();
        assert!(next < distance, "{} should be below {}", next, distance);
        distance = next;
    }
}

#[test]
fn test_different_size_classes_ignore_each_other() {
    let mut simulation = Simulation::new(FlockConfig::default()).unwrap();
    simulation
        .add_agents(&[spawn(50f64, 50f64, 1), spawn(55f64, 50f64, 2)])
        .unwrap();
    simulation.step(&mut |_: &[Agent]| {}).unwrap();
    assert_eq!(simulation.agents()[0].position, Point::new(50f64, 50f64));
    assert_eq!(simulation.agents()[1].position, Point::new(55f64, 50f64));
}

#[test]
fn test_speed_stays_within_limit() {
    let config = flock_config();
    let mut simulation = seeded_flock(&config, 3);
    for _ in 0..30 {
        simulation
            .step(&mut |agents: &[Agent]| {
                for agent in agents {
                    let limit = config.speed_limit.for_size_class(agent.size_class());
                    assert!(agent.speed() <= limit + 1e-9);
                }
            })
            .unwrap();
    }
    assert_eq!(simulation.frame(), 30);
}

#[test]
fn test_parallel_step_matches_serial_step() {
    let serial_config = flock_config();
    let mut parallel_config = serial_config;
    parallel_config.parallel = true;

    let mut serial = seeded_flock(&serial_config, 99);
    let mut parallel = seeded_flock(&parallel_config, 99);
    for _ in 0..20 {
        serial.step(&mut |_: &[Agent]| {}).unwrap();
        parallel.step(&mut |_: &[Agent]| {}).unwrap();
    }

    for (a, b) in serial.agents().iter().zip(parallel.agents()) {
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
    }
}

#[test]
fn test_linear_index_flock_tracks_quadtree_flock() {
    let quad_config = flock_config();
    let mut linear_config = quad_config;
    linear_config.index.kind = IndexKind::Linear;

    let mut quad = seeded_flock(&quad_config, 5);
    let mut linear = seeded_flock(&linear_config, 5);
    for _ in 0..5 {
        quad.step(&mut |_: &[Agent]| {}).unwrap();
        linear.step(&mut |_: &[Agent]| {}).unwrap();
    }

    for (a, b) in quad.agents().iter().zip(linear.agents()) {
        assert!((a.position - b.position).norm() < 1e-6);
    }
}

#[test]
fn test_coincident_agents_fail_fast() {
    let mut config = FlockConfig::default();
    config.index.capacity = 1;
    config.index.max_depth = 4;
    let mut simulation = Simulation::new(config).unwrap();
    simulation
        .add_agents(&[spawn(40f64, 40f64, 1), spawn(40f64, 40f64, 1)])
        .unwrap();

    let result = simulation.step(&mut |_: &[Agent]| {});
    assert_eq!(
        result,
        Err(FlockError::Index(IndexError::MaxDepthExceeded { max_depth: 4 }))
    );
}

#[test]
fn test_config_file_drives_simulation() {
    let config = FlockConfig::from_yaml(
        "
world: { width: 400, height: 300 }
index: { capacity: 8 }
perception_range: 50
separation_factor: 0.5
speed_limit: { flat: 1.5 }
neighbour_policy: any
flock: { size: 120, size_classes: 2, seed: 17 }
",
    )
    .unwrap();
    let mut simulation = Simulation::new(config).unwrap();
    simulation
        .spawn(&mut RandomFlock::from_config(&config.flock))
        .unwrap();
    assert_eq!(simulation.agents().len(), 120);

    for _ in 0..10 {
        simulation.step(&mut |_: &[Agent]| {}).unwrap();
    }
    let bounds = simulation.bounds();
    for agent in simulation.agents() {
        assert!(agent.speed() <= 1.5f64 + 1e-9);
        // Wrapping happens before the move, so one step of slack
        assert!(agent.position.x >= bounds.x - 1.5f64);
        assert!(agent.position.x <= bounds.right() + 1.5f64);
    }

    let mut divisions = 0;
    if let Some(index) = simulation.spatial_index() {
        index.visit_divisions(&mut |_| divisions += 1);
    }
    assert!(divisions > 0);
}
