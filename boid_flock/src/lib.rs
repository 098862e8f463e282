use rayon::prelude::*;
use tracing::{debug, info};

pub extern crate nalgebra as na;
use na::Vector2;

pub mod config;
pub mod error;
pub mod flocking_rules;
pub mod neighbourhood;
pub mod spawn;
pub mod spatial_index;

pub use crate::config::{FlockConfig, IndexKind, SpeedLimit};
pub use crate::error::{ConfigError, FlockError, IndexError};
pub use crate::flocking_rules::flocking_rule::FlockingRule;
pub use crate::neighbourhood::{NeighbourPolicy, NeighbourhoodQuery};
pub use crate::spawn::flock_generator::{AgentSpawn, FlockGenerator, RandomFlock};
pub use crate::spatial_index::rectangle::Rectangle;
pub use crate::spatial_index::spatial_index::SpatialIndex;

use crate::flocking_rules::flocking_rule::classic_rules;
use crate::spatial_index::spatial_index::{build_index, IndexedPoint};

/// Agent ID
pub type AgentId = usize;

/// Point
pub type Point = Vector2<f64>;

/// 2-vector
pub type Vec2f = Vector2<f64>;

/// Data representing an individual boid
#[derive(Clone, Copy, Debug)]
pub struct Agent {
    /// Unique Agent ID, also the agent's slot in [`Simulation::agents`]
    pub agent_id: AgentId,
    /// Position of the agent
    pub position: Point,
    /// Distance travelled per step
    pub velocity: Vec2f,
    /// Render scale and flocking group. Fixed once the agent exists.
    size_class: u32,
}

impl Agent {
    pub fn new(
        agent_id: AgentId,
        position: Point,
        velocity: Vec2f,
        size_class: u32,
    ) -> Result<Self, FlockError> {
        let finite = position.iter().chain(velocity.iter()).all(|v| v.is_finite());
        if !finite {
            return Err(FlockError::NonFiniteAgent { index: agent_id });
        }
        if size_class == 0 {
            return Err(FlockError::InvalidSizeClass { index: agent_id });
        }
        Ok(Self {
            agent_id,
            position,
            velocity,
            size_class,
        })
    }

    pub fn size_class(&self) -> u32 {
        self.size_class
    }

    /// Direction of travel in radians, as used to orient the agent on screen.
    pub fn heading(&self) -> f64 {
        self.velocity.y.atan2(self.velocity.x)
    }

    pub fn speed(&self) -> f64 {
        self.velocity.norm()
    }
}

/// Agents are the same agent when their ids match, whatever their state.
impl PartialEq for Agent {
    fn eq(&self, other: &Self) -> bool {
        self.agent_id == other.agent_id
    }
}

impl Eq for Agent {}

/// Receives the agent list once per displayed frame.
pub trait FrameSink {
    fn publish(&mut self, agents: &[Agent]);
}

impl<F: FnMut(&[Agent])> FrameSink for F {
    fn publish(&mut self, agents: &[Agent]) {
        self(agents)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
}

/// A flock and everything needed to advance it one frame at a time.
///
/// Scheduling is left to the caller: call [`Simulation::step`] once per tick.
pub struct Simulation {
    /// All agents, in update order
    agents: Vec<Agent>,
    config: FlockConfig,
    /// World bounds, also the root of every frame's index
    bounds: Rectangle,
    /// Applied in order to every agent
    rules: Vec<Box<dyn FlockingRule>>,
    /// Index built by the last simulated frame
    spatial_index: Option<Box<dyn SpatialIndex>>,
    state: RunState,
    frame: u64,
}

impl Simulation {
    /// Create a new, empty simulation running the classic boid rules
    pub fn new(config: FlockConfig) -> Result<Self, FlockError> {
        config.validate()?;
        let bounds = Rectangle::new(0f64, 0f64, config.world_width, config.world_height)?;
        Ok(Self {
            agents: vec![],
            config,
            bounds,
            rules: classic_rules(&config),
            spatial_index: None,
            state: RunState::Running,
            frame: 0,
        })
    }

    /// Replaces the steering rules. They run in the given order.
    pub fn with_rules(mut self, rules: Vec<Box<dyn FlockingRule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Adds agents. Either all of them are accepted or none is.
    pub fn add_agents(&mut self, spawns: &[AgentSpawn]) -> Result<Vec<AgentId>, FlockError> {
        let first_id = self.agents.len();
        let new_agents = spawns
            .iter()
            .enumerate()
            .map(|(i, spawn)| {
                Agent::new(first_id + i, spawn.position, spawn.velocity, spawn.size_class)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let ids = new_agents.iter().map(|agent| agent.agent_id).collect();
        self.agents.extend(new_agents);
        info!(added = spawns.len(), total = self.agents.len(), "added agents");
        Ok(ids)
    }

    /// Adds whatever `generator` produces for the current bounds.
    pub fn spawn(&mut self, generator: &mut dyn FlockGenerator) -> Result<Vec<AgentId>, FlockError> {
        let spawns = generator.spawn(&self.bounds);
        self.add_agents(&spawns)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }

    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.state == RunState::Paused
    }

    /// Number of frames simulated so far. Paused frames do not count.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// The index built by the most recent simulated frame.
    pub fn spatial_index(&self) -> Option<&dyn SpatialIndex> {
        self.spatial_index.as_deref()
    }

    /// Flips between running and paused. Takes effect on the next step.
    pub fn toggle_pause(&mut self) -> RunState {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
        info!(state = ?self.state, "toggled pause");
        self.state
    }

    /// Changes the world size. Agents keep their positions and wrap back in
    /// on the next step.
    pub fn resize(&mut self, width: f64, height: f64) -> Result<(), FlockError> {
        self.bounds = Rectangle::new(0f64, 0f64, width, height)?;
        self.config.world_width = width;
        self.config.world_height = height;
        info!(width, height, "resized world");
        Ok(())
    }

    /// Advances the flock one frame unless paused, then publishes the agents.
    pub fn step(&mut self, sink: &mut dyn FrameSink) -> Result<(), FlockError> {
        if self.state == RunState::Running {
            self.advance()?;
        }
        sink.publish(&self.agents);
        Ok(())
    }

    fn advance(&mut self) -> Result<(), FlockError> {
        let mut index = build_index(self.bounds, &self.config.index)?;
        for agent in &self.agents {
            index.insert(IndexedPoint::new(agent.position, agent.agent_id))?;
        }
        debug!(
            frame = self.frame,
            indexed = index.len(),
            agents = self.agents.len(),
            "rebuilt spatial index"
        );

        // Rules read neighbours as they were before anybody moved
        let snapshot = self.agents.clone();
        let query = NeighbourhoodQuery::new(&*index, &snapshot, self.config.neighbour_policy);
        let rules = &self.rules;
        let speed_limit = self.config.speed_limit;
        let bounds = self.bounds;
        let update = |agent: &mut Agent| {
            let velocity = steer(agent, &query, rules);
            agent.velocity = clamp_speed(velocity, speed_limit.for_size_class(agent.size_class));
            wrap_position(&mut agent.position, &bounds);
            agent.position += agent.velocity;
        };

        if self.config.parallel {
            self.agents.par_iter_mut().for_each(update);
        } else {
            self.agents.iter_mut().for_each(update);
        }

        self.spatial_index = Some(index);
        self.frame += 1;
        Ok(())
    }
}

/// Runs every rule against `agent`, each one seeing the velocity the
/// previous ones produced.
fn steer(agent: &Agent, query: &NeighbourhoodQuery, rules: &[Box<dyn FlockingRule>]) -> Vec2f {
    rules.iter().fold(agent.velocity, |velocity, rule| {
        let neighbours = query.neighbours(agent, rule.radius());
        velocity + rule.steer(agent, velocity, &neighbours)
    })
}

/// Scales `velocity` down to `limit` if it is faster.
pub fn clamp_speed(velocity: Vec2f, limit: f64) -> Vec2f {
    let speed = velocity.norm();
    if speed > limit {
        velocity * (limit / speed)
    } else {
        velocity
    }
}

/// Moves a point that left `bounds` onto the opposite edge.
pub fn wrap_position(position: &mut Point, bounds: &Rectangle) {
    if position.x < bounds.x {
        position.x = bounds.right();
    } else if position.x > bounds.right() {
        position.x = bounds.x;
    }
    if position.y < bounds.y {
        position.y = bounds.bottom();
    } else if position.y > bounds.bottom() {
        position.y = bounds.y;
    }
}
