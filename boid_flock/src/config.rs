use yaml_rust::{Yaml, YamlLoader};

use crate::error::ConfigError;
use crate::neighbourhood::NeighbourPolicy;
use crate::spatial_index::quadtree::DEFAULT_MAX_DEPTH;

/// Which [`crate::SpatialIndex`] implementation a frame is built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexKind {
    QuadTree,
    Linear,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexConfig {
    pub kind: IndexKind,
    /// Points per quadtree leaf before it splits
    pub capacity: usize,
    pub max_depth: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            kind: IndexKind::QuadTree,
            capacity: 20,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Upper bound on an agent's speed after the flocking rules ran.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpeedLimit {
    /// Same limit for everybody.
    Flat { limit: f64 },
    /// `factor * size_class`, so bigger agents fly faster.
    PerSizeClass { factor: f64 },
}

impl SpeedLimit {
    pub fn for_size_class(&self, size_class: u32) -> f64 {
        match self {
            SpeedLimit::Flat { limit } => *limit,
            SpeedLimit::PerSizeClass { factor } => factor * size_class as f64,
        }
    }
}

/// Parameters for [`crate::spawn::flock_generator::RandomFlock`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnConfig {
    pub size: usize,
    /// Size classes are handed out cyclically from 1 up to this value
    pub size_classes: u32,
    pub max_initial_speed: f64,
    pub seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            size: 1000,
            size_classes: 5,
            max_initial_speed: 2f64,
            seed: None,
        }
    }
}

/// Every tunable of a flock simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlockConfig {
    pub world_width: f64,
    pub world_height: f64,
    pub index: IndexConfig,
    /// Radius used by cohesion and alignment
    pub perception_range: f64,
    /// Separation radius as a fraction of `perception_range`
    pub separation_factor: f64,
    pub cohesion_strength: f64,
    pub separation_strength: f64,
    pub alignment_strength: f64,
    pub speed_limit: SpeedLimit,
    pub neighbour_policy: NeighbourPolicy,
    /// Evaluate the flocking rules on the rayon thread pool
    pub parallel: bool,
    pub flock: SpawnConfig,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            world_width: 100f64,
            world_height: 100f64,
            index: IndexConfig::default(),
            perception_range: 30f64,
            separation_factor: 0.75f64,
            cohesion_strength: 0.01f64,
            separation_strength: 0.01f64,
            alignment_strength: 0.04f64,
            speed_limit: SpeedLimit::PerSizeClass { factor: 0.5f64 },
            neighbour_policy: NeighbourPolicy::SameSizeClass,
            parallel: false,
            flock: SpawnConfig::default(),
        }
    }
}

impl FlockConfig {
    pub fn separation_range(&self) -> f64 {
        self.perception_range * self.separation_factor
    }

    /// Loads a configuration from yaml. Keys that are absent keep their
    /// default value, e.g.
    /// ```yaml
    /// world: { width: 800, height: 600 }
    /// index: { kind: quadtree, capacity: 20 }
    /// perception_range: 50
    /// speed_limit: { flat: 2.5 }
    /// ```
    pub fn from_yaml(yaml_str: &str) -> Result<Self, ConfigError> {
        let docs =
            YamlLoader::load_from_str(yaml_str).map_err(|err| ConfigError::Parse(err.to_string()))?;
        let mut config = Self::default();
        let Some(doc) = docs.first() else {
            return Ok(config);
        };

        read_f64(&doc["world"]["width"], "world.width", &mut config.world_width)?;
        read_f64(&doc["world"]["height"], "world.height", &mut config.world_height)?;

        let index = &doc["index"];
        if let Some(kind) = read_str(&index["kind"], "index.kind")? {
            config.index.kind = match kind {
                "quadtree" => IndexKind::QuadTree,
                "linear" => IndexKind::Linear,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "index.kind",
                        reason: format!("unknown index `{}`", other),
                    })
                }
            };
        }
        read_usize(&index["capacity"], "index.capacity", &mut config.index.capacity)?;
        read_usize(&index["max_depth"], "index.max_depth", &mut config.index.max_depth)?;

        read_f64(&doc["perception_range"], "perception_range", &mut config.perception_range)?;
        read_f64(&doc["separation_factor"], "separation_factor", &mut config.separation_factor)?;
        read_f64(&doc["cohesion_strength"], "cohesion_strength", &mut config.cohesion_strength)?;
        read_f64(
            &doc["separation_strength"],
            "separation_strength",
            &mut config.separation_strength,
        )?;
        read_f64(&doc["alignment_strength"], "alignment_strength", &mut config.alignment_strength)?;

        let speed_limit = &doc["speed_limit"];
        let flat = opt_f64(&speed_limit["flat"], "speed_limit.flat")?;
        let per_size_class = opt_f64(&speed_limit["per_size_class"], "speed_limit.per_size_class")?;
        config.speed_limit = match (flat, per_size_class) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    key: "speed_limit",
                    reason: "set either `flat` or `per_size_class`, not both".to_owned(),
                })
            }
            (Some(limit), None) => SpeedLimit::Flat { limit },
            (None, Some(factor)) => SpeedLimit::PerSizeClass { factor },
            (None, None) => config.speed_limit,
        };

        if let Some(policy) = read_str(&doc["neighbour_policy"], "neighbour_policy")? {
            config.neighbour_policy = match policy {
                "same_size_class" => NeighbourPolicy::SameSizeClass,
                "any" => NeighbourPolicy::Any,
                other => {
                    return Err(ConfigError::InvalidValue {
                        key: "neighbour_policy",
                        reason: format!("unknown policy `{}`", other),
                    })
                }
            };
        }

        match &doc["parallel"] {
            Yaml::Boolean(parallel) => config.parallel = *parallel,
            Yaml::BadValue | Yaml::Null => {}
            _ => {
                return Err(ConfigError::WrongType {
                    key: "parallel",
                    expected: "a boolean",
                })
            }
        }

        let flock = &doc["flock"];
        read_usize(&flock["size"], "flock.size", &mut config.flock.size)?;
        let mut size_classes = config.flock.size_classes as usize;
        read_usize(&flock["size_classes"], "flock.size_classes", &mut size_classes)?;
        config.flock.size_classes =
            u32::try_from(size_classes).map_err(|_| ConfigError::InvalidValue {
                key: "flock.size_classes",
                reason: "too large".to_owned(),
            })?;
        read_f64(
            &flock["max_initial_speed"],
            "flock.max_initial_speed",
            &mut config.flock.max_initial_speed,
        )?;
        if let Some(seed) = opt_usize(&flock["seed"], "flock.seed")? {
            config.flock.seed = Some(seed as u64);
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("world.width", self.world_width)?;
        positive("world.height", self.world_height)?;
        if self.index.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "index.capacity",
                reason: "must be at least 1".to_owned(),
            });
        }
        positive("perception_range", self.perception_range)?;
        positive("separation_factor", self.separation_factor)?;
        non_negative("cohesion_strength", self.cohesion_strength)?;
        non_negative("separation_strength", self.separation_strength)?;
        non_negative("alignment_strength", self.alignment_strength)?;
        match self.speed_limit {
            SpeedLimit::Flat { limit } => positive("speed_limit.flat", limit)?,
            SpeedLimit::PerSizeClass { factor } => positive("speed_limit.per_size_class", factor)?,
        }
        if self.flock.size_classes == 0 {
            return Err(ConfigError::InvalidValue {
                key: "flock.size_classes",
                reason: "must be at least 1".to_owned(),
            });
        }
        non_negative("flock.max_initial_speed", self.flock.max_initial_speed)?;
        Ok(())
    }
}

fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0f64 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            reason: format!("{} is not a positive number", value),
        })
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0f64 {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue {
            key,
            reason: format!("{} is not a finite, non negative number", value),
        })
    }
}

fn opt_f64(node: &Yaml, key: &'static str) -> Result<Option<f64>, ConfigError> {
    let wrong_type = ConfigError::WrongType {
        key,
        expected: "a number",
    };
    match node {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(value) => Ok(Some(*value as f64)),
        Yaml::Real(_) => node.as_f64().map(Some).ok_or(wrong_type),
        _ => Err(wrong_type),
    }
}

fn opt_usize(node: &Yaml, key: &'static str) -> Result<Option<usize>, ConfigError> {
    match node {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::Integer(value) if *value >= 0 => Ok(Some(*value as usize)),
        _ => Err(ConfigError::WrongType {
            key,
            expected: "a non negative integer",
        }),
    }
}

fn read_f64(node: &Yaml, key: &'static str, target: &mut f64) -> Result<(), ConfigError> {
    if let Some(value) = opt_f64(node, key)? {
        *target = value;
    }
    Ok(())
}

fn read_usize(node: &Yaml, key: &'static str, target: &mut usize) -> Result<(), ConfigError> {
    if let Some(value) = opt_usize(node, key)? {
        *target = value;
    }
    Ok(())
}

fn read_str<'a>(node: &'a Yaml, key: &'static str) -> Result<Option<&'a str>, ConfigError> {
    match node {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(value) => Ok(Some(value.as_str())),
        _ => Err(ConfigError::WrongType {
            key,
            expected: "a string",
        }),
    }
}
