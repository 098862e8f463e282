use boid_flock::{
    Agent, FlockConfig, FlockError, FrameSink, Point, RandomFlock, Rectangle, Simulation,
};
use nannou::prelude::*;
use tracing::{error, info};

/// World size when no config file is given
const DEFAULT_WORLD: (f64, f64) = (1024f64, 768f64);

/// Render sink keeping the most recent published frame
struct LatestFrame {
    agents: Vec<Agent>,
}

impl FrameSink for LatestFrame {
    fn publish(&mut self, agents: &[Agent]) {
        self.agents.clear();
        self.agents.extend_from_slice(agents);
    }
}

struct FlockModel {
    simulation: Simulation,
    latest: LatestFrame,
    show_divisions: bool,
}

fn load_config() -> Result<FlockConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            info!(%path, "loading config");
            let yaml = std::fs::read_to_string(path)?;
            Ok(FlockConfig::from_yaml(&yaml)?)
        }
        None => Ok(default_config()),
    }
}

fn default_config() -> FlockConfig {
    let mut config = FlockConfig::default();
    config.world_width = DEFAULT_WORLD.0;
    config.world_height = DEFAULT_WORLD.1;
    config
}

fn build_simulation(config: FlockConfig) -> Result<Simulation, FlockError> {
    let mut simulation = Simulation::new(config)?;
    simulation.spawn(&mut RandomFlock::from_config(&config.flock))?;
    let config = simulation.config();
    info!(
        agents = simulation.agents().len(),
        width = config.world_width,
        height = config.world_height,
        index = ?config.index.kind,
        "simulation ready"
    );
    Ok(simulation)
}

/// Setup the model
fn create_flock_model(app: &App) -> FlockModel {
    let config = load_config().unwrap_or_else(|err| {
        error!(%err, "could not load config, using defaults");
        default_config()
    });

    if let Err(err) = app
        .new_window()
        .size(config.world_width as u32, config.world_height as u32)
        .title("boid_flock")
        .view(view)
        .mouse_pressed(mouse_pressed)
        .key_pressed(key_pressed)
        .resized(resized)
        .build()
    {
        error!(?err, "could not open window");
        app.quit();
    }

    let simulation = match build_simulation(config) {
        Ok(simulation) => simulation,
        Err(err) => {
            error!(%err, "could not build simulation");
            std::process::exit(1);
        }
    };

    FlockModel {
        simulation,
        latest: LatestFrame { agents: vec![] },
        show_divisions: false,
    }
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    nannou::app(create_flock_model).update(update).run();
}

fn update(app: &App, model: &mut FlockModel, _update: Update) {
    if let Err(err) = model.simulation.step(&mut model.latest) {
        error!(%err, "simulation step failed");
        app.quit();
    }
}

fn mouse_pressed(_app: &App, model: &mut FlockModel, _button: MouseButton) {
    model.simulation.toggle_pause();
}

fn key_pressed(_app: &App, model: &mut FlockModel, key: Key) {
    if key == Key::D {
        model.show_divisions = !model.show_divisions;
    }
}

fn resized(_app: &App, model: &mut FlockModel, size: Vec2) {
    if let Err(err) = model.simulation.resize(size.x as f64, size.y as f64) {
        error!(%err, "ignoring resize");
    }
}

/// World space has its origin top left with y pointing down
fn to_screen(point: Point, bounds: &Rectangle) -> Point2 {
    pt2(
        (point.x - bounds.width / 2f64) as f32,
        (bounds.height / 2f64 - point.y) as f32,
    )
}

fn view(app: &App, model: &FlockModel, frame: Frame) {
    // Begin drawing
    let draw = app.draw();
    draw.background().color(BLACK);

    let bounds = model.simulation.bounds();

    if model.show_divisions {
        if let Some(index) = model.simulation.spatial_index() {
            index.visit_divisions(&mut |cell| {
                let centre = cell.center();
                draw.line()
                    .start(to_screen(Point::new(centre.x, cell.y), &bounds))
                    .end(to_screen(Point::new(centre.x, cell.bottom()), &bounds))
                    .weight(1f32)
                    .color(DIMGRAY);
                draw.line()
                    .start(to_screen(Point::new(cell.x, centre.y), &bounds))
                    .end(to_screen(Point::new(cell.right(), centre.y), &bounds))
                    .weight(1f32)
                    .color(DIMGRAY);
            });
        }
    }

    for agent in &model.latest.agents {
        let size = agent.size_class() as f32;
        draw.tri()
            .points(pt2(size, 0f32), pt2(-2f32 * size, size), pt2(-2f32 * size, -size))
            .xy(to_screen(agent.position, &bounds))
            .rotate(-agent.heading() as f32)
            .color(WHITE);
    }

    if model.simulation.is_paused() {
        draw.text("paused")
            .xy(pt2(0f32, (bounds.height / 2f64) as f32 - 20f32))
            .color(WHITE);
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!(?err, "could not draw frame");
    }
}
