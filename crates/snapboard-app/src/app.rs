//! Headless application: builds a canvas and replays pointer scripts.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use snapboard_core::canvas::{Canvas, PendingShape};
use snapboard_core::config::{ConfigError, EngineConfig};
use snapboard_core::factory::{AvatarLayout, RectangleFactory};
use snapboard_core::input::{ClickTracker, PointerEvent};
use snapboard_core::scene::Scene;
use snapboard_core::shapes::Shape;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Gap assumed between presses that carry no timestamp; longer than any
/// sensible double-click window.
const IDLE_GAP_MS: u64 = 1_000;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Script error: {0}")]
    Script(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub width: f64,
    pub height: f64,
    /// Add the two demo shapes on startup.
    pub demo_shapes: bool,
    pub engine: EngineConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            demo_shapes: true,
            engine: EngineConfig::default(),
        }
    }
}

/// One step of a pointer script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptStep {
    /// Pointer down. `at_ms` is the press time used for double-click
    /// detection.
    Press {
        x: f64,
        y: f64,
        #[serde(default)]
        at_ms: Option<u64>,
    },
    Move { x: f64, y: f64 },
    Release { x: f64, y: f64 },
}

/// Parse a JSON array of script steps.
pub fn load_script(json: &str) -> Result<Vec<ScriptStep>, AppError> {
    Ok(serde_json::from_str(json)?)
}

/// Built-in script: drag the first demo shape against the left edge,
/// double-click the background and draw a rectangle, then resize the
/// first shape from its bottom-right corner.
pub fn demo_script() -> Vec<ScriptStep> {
    use ScriptStep::*;
    vec![
        Press { x: 100.0, y: 80.0, at_ms: Some(0) },
        Move { x: 66.0, y: 140.0 },
        Move { x: 66.0, y: 150.0 },
        Release { x: 66.0, y: 150.0 },
        Press { x: 600.0, y: 100.0, at_ms: Some(1_000) },
        Release { x: 600.0, y: 100.0 },
        Press { x: 600.0, y: 100.0, at_ms: Some(1_200) },
        Release { x: 600.0, y: 100.0 },
        Press { x: 600.0, y: 100.0, at_ms: Some(2_000) },
        Move { x: 700.0, y: 180.0 },
        Release { x: 700.0, y: 180.0 },
        Press { x: 80.0, y: 150.0, at_ms: Some(3_000) },
        Release { x: 80.0, y: 150.0 },
        Press { x: 160.0, y: 210.0, at_ms: Some(4_000) },
        Move { x: 180.0, y: 230.0 },
        Release { x: 180.0, y: 230.0 },
    ]
}

/// Main application struct.
pub struct App {
    canvas: Canvas,
    clicks: ClickTracker,
    factory: RectangleFactory,
    pending: Vec<PendingShape>,
    epoch: Instant,
    clock_ms: u64,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let mut canvas = Canvas::new(Scene::new(config.width, config.height), config.engine.clone());
        if config.demo_shapes {
            for shape in [
                Shape::new(40.0, 40.0, 160.0, 100.0),
                Shape::new(260.0, 200.0, 140.0, 120.0),
            ] {
                match canvas.place_shape(shape) {
                    Some(id) => {
                        if let Err(err) = canvas.set_decoration(id, Box::new(AvatarLayout::default())) {
                            log::warn!("Could not decorate demo shape: {}", err);
                        }
                    }
                    None => log::warn!("Demo shape does not fit the container"),
                }
            }
        }
        Self {
            clicks: ClickTracker::new(&config.engine),
            canvas,
            factory: RectangleFactory::new(),
            pending: Vec::new(),
            epoch: Instant::now(),
            clock_ms: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Feed one script step to the canvas. Shapes drawn by this step are
    /// issued to the factory and placed by a later [`App::settle`].
    pub fn step(&mut self, step: &ScriptStep) {
        let requests = match *step {
            ScriptStep::Press { x, y, at_ms } => {
                let position = Point::new(x, y);
                let at = at_ms.unwrap_or(self.clock_ms + IDLE_GAP_MS);
                self.clock_ms = at;
                let target = self.canvas.hit_test(position);
                let pressed = self.canvas.handle_event(PointerEvent::Press { position, target });
                let doubled = self
                    .clicks
                    .press(position, self.epoch + Duration::from_millis(at));
                let activated = if doubled {
                    self.canvas.handle_event(PointerEvent::DoubleActivate { position })
                } else {
                    None
                };
                [pressed, activated]
            }
            ScriptStep::Move { x, y } => [
                self.canvas.handle_event(PointerEvent::Move {
                    position: Point::new(x, y),
                }),
                None,
            ],
            ScriptStep::Release { x, y } => [
                self.canvas.handle_event(PointerEvent::Release {
                    position: Point::new(x, y),
                }),
                None,
            ],
        };
        for request in requests.into_iter().flatten() {
            match self.canvas.issue_commit(&self.factory, request) {
                Ok(pending) => self.pending.push(pending),
                Err(err) => log::warn!("Commit not issued: {}", err),
            }
        }
    }

    /// Wait for every issued commit and place the shapes that still fit.
    pub async fn settle(&mut self) {
        for pending in std::mem::take(&mut self.pending) {
            let created = pending.await;
            match self.canvas.place_committed(created) {
                Ok(Some(id)) => log::info!("Committed drawn shape {}", id),
                Ok(None) => log::info!("Drawn shape did not fit and was dropped"),
                Err(err) => log::warn!("Commit failed: {}", err),
            }
        }
    }

    /// Number of commits issued and not yet placed.
    pub fn pending_commits(&self) -> usize {
        self.pending.len()
    }

    /// Replay a whole script, settling commits between steps.
    pub async fn replay(&mut self, steps: &[ScriptStep]) {
        for step in steps {
            self.step(step);
            self.settle().await;
        }
    }

    /// Log every shape in the scene.
    pub fn log_scene(&self) {
        let scene = self.canvas.scene();
        log::info!("Scene has {} shapes", scene.len());
        for shape in scene.shapes_ordered() {
            log::info!(
                "  {} at ({:.1}, {:.1}) {:.1}x{:.1} rot {:.1}°",
                shape.id(),
                shape.pose.position.x,
                shape.pose.position.y,
                shape.size.width,
                shape.size.height,
                shape.pose.rotation.to_degrees()
            );
        }
    }

    pub fn dispose(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Dropping {} pending commits", self.pending.len());
            self.pending.clear();
        }
        self.canvas.dispose();
        self.clicks.reset();
    }

    /// Run with CLI arguments: optional engine config path, then optional
    /// script path.
    pub async fn run(args: &[String]) -> Result<(), AppError> {
        let mut config = AppConfig::default();
        if let Some(path) = args.first() {
            let json = std::fs::read_to_string(path)?;
            config.engine = EngineConfig::from_json(&json)?;
            log::info!("Loaded engine config from {}", path);
        }
        let script = match args.get(1) {
            Some(path) => load_script(&std::fs::read_to_string(path)?)?,
            None => demo_script(),
        };

        let mut app = App::new(config);
        app.replay(&script).await;
        app.log_scene();
        app.dispose();
        Ok(())
    }
}
