//! Canvas 2D backend
//!
//! Paints a `DrawList` onto a `<canvas>`. Sprites come from image assets;
//! until they load (or if they never do) targets and the background are drawn
//! with plain shapes instead.

use std::cell::Cell;
use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use super::scene::{
    CURSOR_RADIUS, DrawCmd, DrawList, SPRITE_FRAME_PX, TARGET_DRAW_SIZE, burst_radius, kind_color,
    sprite_source,
};
use crate::sim::{Facing, TargetKind, TargetState};

pub const SPRITE_SHEET_SRC: &str = "assets/duck-sheet.png";
pub const BACKGROUND_SRC: &str = "assets/background.png";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssetState {
    Loading,
    Ready,
    Failed,
}

/// An image asset polled for readiness each frame
struct Asset {
    image: Option<HtmlImageElement>,
    src: &'static str,
    reported: Cell<bool>,
}

impl Asset {
    fn load(src: &'static str) -> Self {
        let image = match HtmlImageElement::new() {
            Ok(image) => {
                image.set_src(src);
                Some(image)
            }
            Err(e) => {
                log::error!("Failed to create image for {}: {:?}", src, e);
                None
            }
        };
        Self {
            image,
            src,
            reported: Cell::new(false),
        }
    }

    fn state(&self) -> AssetState {
        let Some(image) = &self.image else {
            return AssetState::Failed;
        };
        if !image.complete() {
            return AssetState::Loading;
        }
        if image.natural_width() == 0 {
            if !self.reported.replace(true) {
                log::error!("Failed to load {}, drawing shapes instead", self.src);
            }
            return AssetState::Failed;
        }
        AssetState::Ready
    }

    fn ready(&self) -> Option<&HtmlImageElement> {
        match self.state() {
            AssetState::Ready => self.image.as_ref(),
            _ => None,
        }
    }
}

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    sprites: Asset,
    background: Asset,
    size: (f64, f64),
}

impl CanvasRenderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        let size = (f64::from(canvas.width()), f64::from(canvas.height()));
        log::info!("Canvas renderer ready ({}x{})", size.0, size.1);

        Ok(Self {
            canvas,
            ctx,
            sprites: Asset::load(SPRITE_SHEET_SRC),
            background: Asset::load(BACKGROUND_SRC),
            size,
        })
    }

    /// Match the backing store to the element's CSS size
    pub fn resize(&mut self, device_pixel_ratio: f64) {
        let width = (f64::from(self.canvas.client_width()) * device_pixel_ratio) as u32;
        let height = (f64::from(self.canvas.client_height()) * device_pixel_ratio) as u32;
        if width == 0 || height == 0 || (f64::from(width), f64::from(height)) == self.size {
            return;
        }
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.size = (f64::from(width), f64::from(height));
        log::debug!("Canvas resized to {}x{}", width, height);
    }

    pub fn draw(&self, list: &DrawList) {
        for cmd in &list.cmds {
            let result = match *cmd {
                DrawCmd::Background => self.draw_background(),
                DrawCmd::Target {
                    pos,
                    sprite_frame,
                    facing,
                    state,
                    kind,
                } => self.draw_target(pos.x, pos.y, sprite_frame, facing, state, kind),
                DrawCmd::Burst { pos, life } => self.draw_burst(pos.x, pos.y, life),
                DrawCmd::Flash { intensity } => {
                    self.draw_flash(intensity);
                    Ok(())
                }
                DrawCmd::Cursor { pos } => self.draw_cursor(pos.x, pos.y),
            };
            if let Err(e) = result {
                log::warn!("Draw error: {:?}", e);
            }
        }
    }

    fn to_px(&self, x: f32, y: f32) -> (f64, f64) {
        (f64::from(x) * self.size.0, f64::from(y) * self.size.1)
    }

    fn scale(&self, fraction: f32) -> f64 {
        f64::from(fraction) * self.size.1
    }

    fn draw_background(&self) -> Result<(), JsValue> {
        let (w, h) = self.size;
        if let Some(image) = self.background.ready() {
            return self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(image, 0.0, 0.0, w, h);
        }

        let sky = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
        sky.add_color_stop(0.0, "#4fa3e0")?;
        sky.add_color_stop(0.75, "#a8d8f0")?;
        sky.add_color_stop(0.76, "#5c8a3a")?;
        sky.add_color_stop(1.0, "#3e6427")?;
        self.ctx.set_fill_style_canvas_gradient(&sky);
        self.ctx.fill_rect(0.0, 0.0, w, h);
        Ok(())
    }

    fn draw_target(
        &self,
        x: f32,
        y: f32,
        frame: u8,
        facing: Facing,
        state: TargetState,
        kind: TargetKind,
    ) -> Result<(), JsValue> {
        let (cx, cy) = self.to_px(x, y);
        let size = self.scale(TARGET_DRAW_SIZE);

        self.ctx.save();
        let result = self.place(cx, cy, facing).and_then(|()| match self.sprites.ready() {
            Some(sheet) => {
                let (sx, sy) = sprite_source(frame);
                self.ctx
                    .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                        sheet,
                        sx,
                        sy,
                        SPRITE_FRAME_PX,
                        SPRITE_FRAME_PX,
                        -size / 2.0,
                        -size / 2.0,
                        size,
                        size,
                    )
            }
            None => self.draw_target_shape(size, frame, state, kind),
        });
        self.ctx.restore();
        result
    }

    /// Move the origin to the target, mirrored when it flies left
    fn place(&self, cx: f64, cy: f64, facing: Facing) -> Result<(), JsValue> {
        self.ctx.translate(cx, cy)?;
        if facing == Facing::Left {
            self.ctx.scale(-1.0, 1.0)?;
        }
        Ok(())
    }

    /// Body, head and a flapping wing, facing right
    fn draw_target_shape(&self, size: f64, frame: u8, state: TargetState, kind: TargetKind) -> Result<(), JsValue> {
        let body = size * 0.3;

        self.ctx.set_fill_style_str(kind_color(kind));
        self.ctx.begin_path();
        self.ctx.ellipse(0.0, 0.0, body, body * 0.7, 0.0, 0.0, TAU)?;
        self.ctx.fill();

        self.ctx.begin_path();
        self.ctx.arc(body * 0.9, -body * 0.5, body * 0.45, 0.0, TAU)?;
        self.ctx.fill();

        self.ctx.set_fill_style_str("#e0a030");
        self.ctx.fill_rect(body * 1.25, -body * 0.55, body * 0.4, body * 0.2);

        // Wing up on even frames, down on odd; tucked while falling
        let wing_y = match (state, frame % 2) {
            (TargetState::Shot, _) => 0.0,
            (_, 0) => -body * 0.8,
            _ => body * 0.4,
        };
        self.ctx.set_fill_style_str("#2b5a33");
        self.ctx.begin_path();
        self.ctx.move_to(-body * 0.4, 0.0);
        self.ctx.line_to(body * 0.2, 0.0);
        self.ctx.line_to(-body * 0.1, wing_y);
        self.ctx.close_path();
        self.ctx.fill();
        Ok(())
    }

    fn draw_burst(&self, x: f32, y: f32, life: f32) -> Result<(), JsValue> {
        let (cx, cy) = self.to_px(x, y);
        let radius = self.scale(burst_radius(life)).max(1.0);

        self.ctx.save();
        self.ctx.set_global_alpha(f64::from(life.clamp(0.0, 1.0)));
        self.ctx.set_stroke_style_str("#ffd23f");
        self.ctx.set_line_width(self.scale(0.006));
        self.ctx.begin_path();
        let result = self.ctx.arc(cx, cy, radius, 0.0, TAU);
        self.ctx.stroke();
        self.ctx.restore();
        result
    }

    fn draw_flash(&self, intensity: f32) {
        let (w, h) = self.size;
        self.ctx.save();
        self.ctx.set_global_alpha(f64::from(intensity.clamp(0.0, 1.0)) * 0.35);
        self.ctx.set_fill_style_str("#ffffff");
        self.ctx.fill_rect(0.0, 0.0, w, h);
        self.ctx.restore();
    }

    fn draw_cursor(&self, x: f32, y: f32) -> Result<(), JsValue> {
        let (cx, cy) = self.to_px(x, y);
        let r = self.scale(CURSOR_RADIUS);

        self.ctx.set_stroke_style_str("#ff3b30");
        self.ctx.set_line_width(self.scale(0.004).max(1.0));
        self.ctx.begin_path();
        self.ctx.arc(cx, cy, r, 0.0, TAU)?;
        self.ctx.move_to(cx - r * 1.4, cy);
        self.ctx.line_to(cx + r * 1.4, cy);
        self.ctx.move_to(cx, cy - r * 1.4);
        self.ctx.line_to(cx, cy + r * 1.4);
        self.ctx.stroke();
        Ok(())
    }
}
