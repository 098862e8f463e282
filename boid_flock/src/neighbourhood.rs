use crate::spatial_index::rectangle::Rectangle;
use crate::spatial_index::spatial_index::SpatialIndex;
use crate::Agent;

/// Decides which agents may see each other at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NeighbourPolicy {
    /// Agents only flock with agents of their own size class.
    SameSizeClass,
    /// Every agent in range counts.
    Any,
}

impl NeighbourPolicy {
    pub fn accepts(&self, agent: &Agent, other: &Agent) -> bool {
        match self {
            NeighbourPolicy::SameSizeClass => agent.size_class() == other.size_class(),
            NeighbourPolicy::Any => true,
        }
    }
}

/// Radius search on top of a frame's spatial index.
///
/// `agents` must be the slice the index was filled from, with every agent
/// stored at the slot equal to its id.
pub struct NeighbourhoodQuery<'a> {
    index: &'a dyn SpatialIndex,
    agents: &'a [Agent],
    policy: NeighbourPolicy,
}

impl<'a> NeighbourhoodQuery<'a> {
    pub fn new(index: &'a dyn SpatialIndex, agents: &'a [Agent], policy: NeighbourPolicy) -> Self {
        Self {
            index,
            agents,
            policy,
        }
    }

    /// Agents other than `agent` closer than `radius` that the policy lets it see.
    pub fn neighbours(&self, agent: &Agent, radius: f64) -> Vec<&'a Agent> {
        let Ok(range) = Rectangle::centered(agent.position, radius) else {
            return vec![];
        };
        let radius_sq = radius * radius;

        self.index
            .query(&range)
            .into_iter()
            .filter_map(|id| self.agents.get(id))
            .filter(|other| {
                other.agent_id != agent.agent_id
                    && (other.position - agent.position).norm_squared() < radius_sq
                    && self.policy.accepts(agent, other)
            })
            .collect()
    }
}
