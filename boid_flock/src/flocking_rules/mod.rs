pub mod alignment;
pub mod cohesion;
pub mod flocking_rule;
pub mod separation;
