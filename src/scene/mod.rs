//! Scene Module
//!
//! The decorative illustration of the home page: a two-hemisphere planet,
//! a pair of moon hemispheres orbiting it and a handful of stars spinning on
//! their own anchors. The scene keeps the scene graph, advances it one frame
//! at a time and recolors its stars when the theme changes.
//!
//! Star placement comes from an injected random source, so a seeded scene
//! always has the same layout.

mod shape;

use std::f64::consts::TAU;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::SceneError;
use crate::theme::{PreferenceStore, Theme, ThemeBus, ThemeSurface};

pub use shape::{Anchor, Ellipse, Hemisphere, RenderItem, ShapeKind, Vector};

pub mod palette {
    pub const BACKGROUND: &str = "#e2e8f0";
    pub const STARS_ON_DARK: &str = "#fff";
    pub const STARS_ON_LIGHT: &str = "#94a3b8";
    pub const PRIMARY_1: &str = "#3730a3";
    pub const PRIMARY_2: &str = "#4338ca";
    pub const SECONDARY: &str = "#831843";
    pub const SECONDARY_2: &str = "#9d174d";
}

const PLANET_SPIN: f64 = 0.005;
const MOON_SPIN: f64 = 0.01;
const STAR_RANGE_X: u32 = 400;
const STAR_RANGE_Y: u32 = 200;
const MAX_STAR_SPEED: f64 = 1.0 / 200.0;

/// Viewports narrower than this get the compact canvas.
pub const COMPACT_BREAKPOINT: f64 = 500.0;
const COMPACT_WIDTH: f64 = 300.0;
const COMPACT_HEIGHT: f64 = COMPACT_WIDTH / 1.5;
const COMPACT_ZOOM: f64 = 0.9;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub canvas: String,
    pub width: f64,
    pub height: f64,
    pub star_count: usize,
    pub frame_ms: u64,
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas: ".zdog-canvas".to_string(),
            width: 600.0,
            height: 400.0,
            star_count: 12,
            frame_ms: 16,
            seed: None,
        }
    }
}

impl SceneConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Illustration {
    pub canvas: String,
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
    pub drag_rotate: bool,
}

impl Illustration {
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Star {
    pub anchor: Anchor,
    pub ellipse: Ellipse,
    pub speed: f64,
}

pub fn star_color(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => palette::STARS_ON_DARK,
        Theme::Light => palette::STARS_ON_LIGHT,
    }
}

#[derive(Debug, Clone)]
pub struct Scene {
    illustration: Illustration,
    planet: Anchor,
    planet_shapes: [Hemisphere; 2],
    moon_base: Anchor,
    moons: [Hemisphere; 2],
    stars: Vec<Star>,
    frames: u64,
    render_graph: Vec<RenderItem>,
}

impl Scene {
    pub fn new<R: Rng + ?Sized>(
        config: &SceneConfig,
        theme: Theme,
        rng: &mut R,
    ) -> Result<Self, SceneError> {
        if config.canvas.trim().is_empty() {
            return Err(SceneError::MissingCanvas);
        }
        if !(config.width > 0.0 && config.height > 0.0) {
            return Err(SceneError::EmptyCanvas {
                selector: config.canvas.clone(),
                width: config.width,
                height: config.height,
            });
        }

        let planet_shapes = [
            Hemisphere {
                diameter: 140.0,
                stroke: None,
                color: palette::PRIMARY_1,
                backface: Some(palette::PRIMARY_2),
                translate: Vector::default(),
                rotate: Vector::default(),
            },
            Hemisphere {
                diameter: 140.0,
                stroke: None,
                color: palette::PRIMARY_2,
                backface: None,
                translate: Vector::default(),
                rotate: Vector::y(TAU / 2.0),
            },
        ];

        let moon = Hemisphere {
            diameter: 60.0,
            stroke: Some(1.0),
            color: palette::SECONDARY,
            backface: Some(palette::SECONDARY_2),
            translate: Vector::new(80.0, -20.0, -80.0),
            rotate: Vector::default(),
        };
        let moons = [
            moon.clone(),
            Hemisphere {
                rotate: Vector::y(TAU / 2.0),
                color: palette::SECONDARY_2,
                ..moon
            },
        ];

        let color = star_color(theme);
        let stars = (0..config.star_count)
            .map(|_| {
                let x = random_signed(rng, STAR_RANGE_X);
                let y = random_signed(rng, STAR_RANGE_Y);
                // (0, MAX_STAR_SPEED]
                let speed = (1.0 - rng.random::<f64>()) * MAX_STAR_SPEED;
                Star {
                    anchor: Anchor::default(),
                    ellipse: Ellipse {
                        diameter: 1.0,
                        stroke: 6.0,
                        fill: true,
                        backface: true,
                        color,
                        translate: Vector::new(x, y, 0.0),
                    },
                    speed,
                }
            })
            .collect();

        let mut scene = Self {
            illustration: Illustration {
                canvas: config.canvas.clone(),
                width: config.width,
                height: config.height,
                zoom: 1.0,
                drag_rotate: true,
            },
            planet: Anchor::default(),
            planet_shapes,
            moon_base: Anchor::default(),
            moons,
            stars,
            frames: 0,
            render_graph: Vec::new(),
        };
        scene.update_render_graph();
        Ok(scene)
    }

    pub fn seeded(config: &SceneConfig, theme: Theme, seed: u64) -> Result<Self, SceneError> {
        Self::new(config, theme, &mut SmallRng::seed_from_u64(seed))
    }

    /// Uses the configured seed, or OS entropy when none is set.
    pub fn from_config(config: &SceneConfig, theme: Theme) -> Result<Self, SceneError> {
        match config.seed {
            Some(seed) => Self::seeded(config, theme, seed),
            None => Self::new(config, theme, &mut SmallRng::from_os_rng()),
        }
    }

    /// Compact layout for narrow viewports: smaller canvas, slight zoom
    /// out and no drag rotation.
    pub fn fit_viewport(&mut self, viewport_width: f64) {
        if viewport_width < COMPACT_BREAKPOINT {
            self.illustration.set_size(COMPACT_WIDTH, COMPACT_HEIGHT);
            self.illustration.zoom = COMPACT_ZOOM;
            self.illustration.drag_rotate = false;
            self.update_render_graph();
        }
    }

    pub fn step(&mut self) {
        self.planet.rotate.y += PLANET_SPIN;
        self.moon_base.rotate.y += MOON_SPIN;
        for star in self.stars.iter_mut() {
            star.anchor.rotate.y += star.speed;
        }
        self.frames += 1;
        self.update_render_graph();
    }

    pub fn advance(&mut self, frames: u32) {
        for _ in 0..frames {
            self.step();
        }
    }

    pub fn recolor_stars(&mut self, theme: Theme) {
        let color = star_color(theme);
        for star in self.stars.iter_mut() {
            star.ellipse.color = color;
        }
        self.update_render_graph();
    }

    /// Recomputes world positions of every shape and orders them back to
    /// front.
    pub fn update_render_graph(&mut self) {
        let zoom = self.illustration.zoom;
        let mut items = Vec::with_capacity(self.planet_shapes.len() + self.moons.len() + self.stars.len());

        for (anchor, shapes, kind) in [
            (&self.planet, &self.planet_shapes, ShapeKind::Planet),
            (&self.moon_base, &self.moons, ShapeKind::Moon),
        ] {
            for shape in shapes.iter() {
                items.push(RenderItem {
                    kind,
                    position: shape.translate.rotate(anchor.rotate).scale(zoom),
                    size: shape.diameter * zoom,
                    color: shape.visible_color(anchor),
                });
            }
        }

        for star in &self.stars {
            items.push(RenderItem {
                kind: ShapeKind::Star,
                position: star.ellipse.translate.rotate(star.anchor.rotate).scale(zoom),
                size: (star.ellipse.diameter + star.ellipse.stroke) * zoom,
                color: star.ellipse.color,
            });
        }

        items.sort_by(|a, b| a.position.z.total_cmp(&b.position.z));
        self.render_graph = items;
    }

    pub fn illustration(&self) -> &Illustration {
        &self.illustration
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render_graph(&self) -> &[RenderItem] {
        &self.render_graph
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            illustration: self.illustration.clone(),
            background: palette::BACKGROUND,
            frames: self.frames,
            planet_rotation: self.planet.rotate.y,
            moon_rotation: self.moon_base.rotate.y,
            stars: self.stars.clone(),
            render_graph: self.render_graph.clone(),
        }
    }
}

fn random_signed<R: Rng + ?Sized>(rng: &mut R, max: u32) -> f64 {
    let magnitude = rng.random_range(1..=max) as f64;
    if rng.random_bool(0.5) { magnitude } else { -magnitude }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub illustration: Illustration,
    pub background: &'static str,
    pub frames: u64,
    pub planet_rotation: f64,
    pub moon_rotation: f64,
    pub stars: Vec<Star>,
    pub render_graph: Vec<RenderItem>,
}

/// Registers the subscriber that keeps star colors in step with the theme.
pub fn attach<S, P>(scene: &Arc<Mutex<Scene>>, bus: &mut ThemeBus<S, P>)
where
    S: ThemeSurface,
    P: PreferenceStore,
{
    let scene = scene.clone();
    bus.subscribe(move |theme| {
        scene
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .recolor_stars(theme);
    });
}

/// Steps the scene once per `frame` until `token` is cancelled. Returns the
/// number of frames this task rendered.
pub async fn animate(scene: Arc<Mutex<Scene>>, frame: Duration, token: CancellationToken) -> u64 {
    let mut interval = tokio::time::interval(frame);
    let mut rendered = 0;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::info!(frames = rendered, "scene animation stopped");
                break;
            }
            _ = interval.tick() => {
                scene.lock().unwrap_or_else(PoisonError::into_inner).step();
                rendered += 1;
            }
        }
    }

    rendered
}
