use crate::flocking_rules::flocking_rule::FlockingRule;
use crate::Agent;
use crate::Vec2f;

/// Nudges an agent's velocity towards the mean velocity of its neighbours.
pub struct Alignment {
    range: f64,
    strength: f64,
}

impl Alignment {
    pub fn new(range: f64, strength: f64) -> Self {
        Self { range, strength }
    }
}

impl FlockingRule for Alignment {
    fn radius(&self) -> f64 {
        self.range
    }

    fn steer(&self, _agent: &Agent, velocity: Vec2f, neighbours: &[&Agent]) -> Vec2f {
        if neighbours.is_empty() {
            return Vec2f::zeros();
        }
        let mean = neighbours
            .iter()
            .fold(Vec2f::zeros(), |sum, other| sum + other.velocity)
            / neighbours.len() as f64;
        (mean - velocity) * self.strength
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    #[test]
    fn test_uses_current_velocity() {
        let agent = Agent::new(0, Point::new(0f64, 0f64), Vec2f::zeros(), 1).unwrap();
        let a = Agent::new(1, Point::new(1f64, 0f64), Vec2f::new(2f64, 0f64), 1).unwrap();
        let b = Agent::new(2, Point::new(0f64, 1f64), Vec2f::new(0f64, 2f64), 1).unwrap();
        let alignment = Alignment::new(30f64, 0.04f64);

        // Mean velocity (1, 1), current velocity already nudged to (1, 0)
        let change = alignment.steer(&agent, Vec2f::new(1f64, 0f64), &[&a, &b]);
        assert!((change - Vec2f::new(0f64, 0.04f64)).norm() < 1e-12);
        assert_eq!(alignment.steer(&agent, Vec2f::new(1f64, 0f64), &[]), Vec2f::zeros());
    }
}
