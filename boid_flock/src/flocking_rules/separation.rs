use crate::flocking_rules::flocking_rule::FlockingRule;
use crate::Agent;
use crate::Vec2f;

/// Pushes an agent away from close neighbours.
///
/// The offsets are summed, not averaged and not weighted by distance, so a
/// tight cluster repels harder than a single neighbour.
pub struct Separation {
    range: f64,
    strength: f64,
}

impl Separation {
    pub fn new(range: f64, strength: f64) -> Self {
        Self { range, strength }
    }
}

impl FlockingRule for Separation {
    fn radius(&self) -> f64 {
        self.range
    }

    fn steer(&self, agent: &Agent, _velocity: Vec2f, neighbours: &[&Agent]) -> Vec2f {
        neighbours
            .iter()
            .fold(Vec2f::zeros(), |push, other| push + (agent.position - other.position))
            * self.strength
    }
}
