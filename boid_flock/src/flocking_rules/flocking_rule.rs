use crate::config::FlockConfig;
use crate::flocking_rules::alignment::Alignment;
use crate::flocking_rules::cohesion::Cohesion;
use crate::flocking_rules::separation::Separation;
use crate::Agent;
use crate::Vec2f;

/// One local steering behaviour.
///
/// Rules never replace a velocity, they return a change that the caller adds
/// on top of whatever the previous rules produced.
pub trait FlockingRule: Send + Sync {
    /// How far this rule looks for neighbours.
    fn radius(&self) -> f64;

    /// Velocity change for `agent`.
    /// # Arguments
    /// * `agent` - The agent as it was at the start of the frame.
    /// * `velocity` - The agent's velocity after the rules before this one.
    /// * `neighbours` - Agents visible within [`FlockingRule::radius`].
    fn steer(&self, agent: &Agent, velocity: Vec2f, neighbours: &[&Agent]) -> Vec2f;
}

/// Cohesion, separation and alignment, in the order they have to run.
pub fn classic_rules(config: &FlockConfig) -> Vec<Box<dyn FlockingRule>> {
    vec![
        Box::new(Cohesion::new(config.perception_range, config.cohesion_strength)),
        Box::new(Separation::new(
            config.separation_range(),
            config.separation_strength,
        )),
        Box::new(Alignment::new(config.perception_range, config.alignment_strength)),
    ]
}
