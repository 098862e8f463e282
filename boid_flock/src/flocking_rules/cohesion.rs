use crate::flocking_rules::flocking_rule::FlockingRule;
use crate::Agent;
use crate::Vec2f;

/// Pulls an agent towards the centre of its neighbours.
pub struct Cohesion {
    range: f64,
    strength: f64,
}

impl Cohesion {
    pub fn new(range: f64, strength: f64) -> Self {
        Self { range, strength }
    }
}

impl FlockingRule for Cohesion {
    fn radius(&self) -> f64 {
        self.range
    }

    fn steer(&self, agent: &Agent, _velocity: Vec2f, neighbours: &[&Agent]) -> Vec2f {
        if neighbours.is_empty() {
            return Vec2f::zeros();
        }
        let centre = neighbours
            .iter()
            .fold(Vec2f::zeros(), |sum, other| sum + other.position)
            / neighbours.len() as f64;
        (centre - agent.position) * self.strength
    }
}
