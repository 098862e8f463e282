use rand::distributions::Open01;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SpawnConfig;
use crate::spatial_index::rectangle::Rectangle;
use crate::{Point, Vec2f};

/// Initial state of an agent before it is handed an id.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AgentSpawn {
    pub position: Point,
    pub velocity: Vec2f,
    pub size_class: u32,
}

/// Produces the flock a simulation starts with.
pub trait FlockGenerator {
    fn spawn(&mut self, bounds: &Rectangle) -> Vec<AgentSpawn>;
}

/// Uniformly scattered agents heading in random directions.
///
/// Positions are drawn from the open interior of the bounds, since a point on
/// the edge is not indexed and stays invisible to the rest of the flock.
pub struct RandomFlock {
    count: usize,
    size_classes: u32,
    max_initial_speed: f64,
    rng: StdRng,
}

impl RandomFlock {
    pub fn new(count: usize, size_classes: u32, max_initial_speed: f64, rng: StdRng) -> Self {
        Self {
            count,
            size_classes: size_classes.max(1),
            max_initial_speed,
            rng,
        }
    }

    /// Seeds from the config, or from OS entropy when no seed is set.
    pub fn from_config(config: &SpawnConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(
            config.size,
            config.size_classes,
            config.max_initial_speed,
            rng,
        )
    }
}

impl FlockGenerator for RandomFlock {
    fn spawn(&mut self, bounds: &Rectangle) -> Vec<AgentSpawn> {
        (0..self.count)
            .map(|i| {
                let heading = self.rng.gen_range(0f64..std::f64::consts::TAU);
                let speed = self.rng.gen::<f64>() * self.max_initial_speed;
                AgentSpawn {
                    position: Point::new(
                        bounds.x + bounds.width * self.rng.sample::<f64, _>(Open01),
                        bounds.y + bounds.height * self.rng.sample::<f64, _>(Open01),
                    ),
                    velocity: Vec2f::new(heading.cos(), heading.sin()) * speed,
                    size_class: 1 + (i as u32 % self.size_classes),
                }
            })
            .collect()
    }
}
