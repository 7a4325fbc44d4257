use serde::{Deserialize, Serialize};

use crate::config::LayoutConfig;

/// Rectangle in world (pixel) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Bounding box of the points, or `None` for an empty set.
    pub fn bounding(points: impl IntoIterator<Item = (f32, f32)>) -> Option<Self> {
        let mut iter = points.into_iter();
        let (fx, fy) = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (fx, fy, fx, fy);
        for (x, y) in iter {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn padded(&self, pad: f32) -> Self {
        Self::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    pub fn to_svg_viewbox(&self) -> String {
        format!("{:.2} {:.2} {:.2} {:.2}", self.x, self.y, self.width, self.height)
    }
}

/// The visible world window plus the screen it is drawn into.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub view: ViewBox,
    pub screen_width: f32,
    pub screen_height: f32,
    min_width: f32,
    max_width: f32,
}

impl Viewport {
    pub fn new(screen_width: f32, screen_height: f32, config: &LayoutConfig) -> Self {
        let screen_width = screen_width.max(1.0);
        let screen_height = screen_height.max(1.0);
        Self {
            view: ViewBox::new(
                -screen_width / 2.0,
                -screen_height / 2.0,
                screen_width,
                screen_height,
            ),
            screen_width,
            screen_height,
            min_width: config.min_view_width,
            max_width: config.max_view_width,
        }
    }

    /// Drags the canvas by `(dx, dy)` world units; content follows the cursor.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.view.x -= dx;
        self.view.y -= dy;
    }

    /// Drag given in screen pixels, converted at the current scale.
    pub fn pan_screen(&mut self, dx: f32, dy: f32) {
        let (sx, sy) = self.world_per_pixel();
        self.pan(dx * sx, dy * sy);
    }

    /// Scales the window by `factor` (above 1 zooms out) keeping the world
    /// point under the screen cursor fixed. The width is clamped to the
    /// configured limits.
    pub fn zoom(&mut self, cursor_x: f32, cursor_y: f32, factor: f32) {
        if !(factor.is_finite() && factor > 0.0) || self.view.width <= 0.0 || self.view.height <= 0.0 {
            return;
        }
        let rel_x = (cursor_x / self.screen_width).clamp(0.0, 1.0);
        let rel_y = (cursor_y / self.screen_height).clamp(0.0, 1.0);
        let world_x = self.view.x + rel_x * self.view.width;
        let world_y = self.view.y + rel_y * self.view.height;

        let new_width = (self.view.width * factor).clamp(self.min_width, self.max_width);
        let applied = new_width / self.view.width;
        let new_height = self.view.height * applied;

        self.view = ViewBox::new(
            world_x - rel_x * new_width,
            world_y - rel_y * new_height,
            new_width,
            new_height,
        );
    }

    /// Frames every position with padding, widening the short side so the
    /// window has `aspect_ratio` (width / height). A lone point gets the
    /// minimum view width. Returns false and leaves the view alone when there
    /// is nothing to frame.
    pub fn fit_to_content(
        &mut self,
        positions: impl IntoIterator<Item = (f32, f32)>,
        aspect_ratio: f32,
        padding: f32,
    ) -> bool {
        let Some(bounds) = ViewBox::bounding(positions) else {
            return false;
        };
        self.view = fit_box(bounds.padded(padding.max(0.0)), aspect_ratio, self.min_width);
        true
    }

    pub fn center_on(&mut self, world_x: f32, world_y: f32) {
        self.view.x = world_x - self.view.width / 2.0;
        self.view.y = world_y - self.view.height / 2.0;
    }

    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        let (sx, sy) = self.world_per_pixel();
        (self.view.x + screen_x * sx, self.view.y + screen_y * sy)
    }

    pub fn world_to_screen(&self, world_x: f32, world_y: f32) -> (f32, f32) {
        let (sx, sy) = self.world_per_pixel();
        ((world_x - self.view.x) / sx, (world_y - self.view.y) / sy)
    }

    fn world_per_pixel(&self) -> (f32, f32) {
        (
            self.view.width / self.screen_width,
            self.view.height / self.screen_height,
        )
    }
}

fn fit_box(bounds: ViewBox, aspect_ratio: f32, min_width: f32) -> ViewBox {
    let aspect = if aspect_ratio.is_finite() && aspect_ratio > 0.0 {
        aspect_ratio
    } else {
        1.0
    };
    let mut fitted = bounds;
    // A single point (or zero padding around one) has no extent to widen.
    if fitted.width <= 0.0 && fitted.height <= 0.0 {
        let width = min_width.max(1.0);
        fitted.x -= width / 2.0;
        fitted.width = width;
    }
    if fitted.height <= 0.0 || fitted.width / fitted.height > aspect {
        let height = fitted.width / aspect;
        fitted.y -= (height - fitted.height) / 2.0;
        fitted.height = height;
    } else {
        let width = fitted.height * aspect;
        fitted.x -= (width - fitted.width) / 2.0;
        fitted.width = width;
    }
    fitted
}

/// Fixed-size overview of the whole map.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniMap {
    pub width_px: f32,
    pub height_px: f32,
    pub bounds: ViewBox,
}

impl MiniMap {
    pub fn new(width_px: f32, height_px: f32, bounds: ViewBox) -> Self {
        Self {
            width_px: width_px.max(1.0),
            height_px: height_px.max(1.0),
            bounds,
        }
    }

    pub fn from_content(
        positions: impl IntoIterator<Item = (f32, f32)>,
        config: &LayoutConfig,
    ) -> Option<Self> {
        let bounds = ViewBox::bounding(positions)?.padded(config.fit_padding);
        Some(Self::new(config.minimap_width, config.minimap_height, bounds))
    }

    /// Mini-map local pixel to world point.
    pub fn to_world(&self, local_x: f32, local_y: f32) -> (f32, f32) {
        let fx = local_x / self.width_px;
        let fy = local_y / self.height_px;
        (
            self.bounds.x + fx * self.bounds.width,
            self.bounds.y + fy * self.bounds.height,
        )
    }

    pub fn project(&self, world_x: f32, world_y: f32) -> (f32, f32) {
        let fx = if self.bounds.width > 0.0 {
            (world_x - self.bounds.x) / self.bounds.width
        } else {
            0.5
        };
        let fy = if self.bounds.height > 0.0 {
            (world_y - self.bounds.y) / self.bounds.height
        } else {
            0.5
        };
        (fx * self.width_px, fy * self.height_px)
    }

    /// The main view drawn as a rectangle in mini-map pixels.
    pub fn indicator(&self, view: &ViewBox) -> ViewBox {
        let (x, y) = self.project(view.x, view.y);
        let (x2, y2) = self.project(view.x + view.width, view.y + view.height);
        ViewBox::new(x, y, x2 - x, y2 - y)
    }

    /// Re-centres `viewport` on the world point under a mini-map click or drag.
    pub fn navigate(&self, viewport: &mut Viewport, local_x: f32, local_y: f32) {
        let (wx, wy) = self.to_world(local_x, local_y);
        viewport.center_on(wx, wy);
    }
}
