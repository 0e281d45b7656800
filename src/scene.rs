//! Terminal presentation: a retained copy of everything the session has
//! shown, drawn into a [`PixelBuf`] each frame.

use crate::config::Tuning;
use crate::pixel::{DIGIT_H, PixelBuf, Rgb, draw_number};
use crate::session::{Obstacle, ObstacleId, Overlay, Presenter, Tilt};
use std::collections::BTreeMap;

// ── Colors ──────────────────────────────────────────────────────────────────

const LETTERBOX: Rgb = Rgb(18, 22, 30);
const SKY_TOP: Rgb = Rgb(70, 180, 200);
const SKY_BOT: Rgb = Rgb(190, 232, 245);
const GRASS: Rgb = Rgb(84, 168, 55);
const PIPE_L: Rgb = Rgb(74, 122, 26);
const PIPE_M: Rgb = Rgb(100, 170, 40);
const PIPE_R: Rgb = Rgb(115, 191, 46);
const PIPE_HI: Rgb = Rgb(145, 215, 62);
const CAP_DARK: Rgb = Rgb(60, 100, 20);
const BIRD_Y: Rgb = Rgb(245, 200, 66);
const BIRD_HI: Rgb = Rgb(255, 225, 100);
const BIRD_WING: Rgb = Rgb(215, 165, 35);
const BIRD_EYE: Rgb = Rgb(255, 255, 255);
const BIRD_PUPIL: Rgb = Rgb(20, 20, 20);
const BIRD_BEAK: Rgb = Rgb(225, 75, 35);
const PANEL_EDGE: Rgb = Rgb(210, 185, 110);
const PANEL: Rgb = Rgb(220, 195, 120);
const WHITE: Rgb = Rgb(255, 255, 255);
const SHADOW: Rgb = Rgb(30, 30, 30);

#[derive(Debug, Clone, Copy, PartialEq)]
struct PipeSprite {
    x: f64,
    top: f64,
    bottom: f64,
}

/// Logical playfield placed on the pixel grid, aspect preserved.
struct Viewport {
    scale: f64,
    ox: f64,
    oy: f64,
}

impl Viewport {
    fn fit(buf: &PixelBuf, width: f64, height: f64) -> Self {
        let (pw, ph) = (buf.width() as f64, buf.height() as f64);
        let scale = (pw / width).min(ph / height);
        Self {
            scale,
            ox: ((pw - width * scale) / 2.0).floor(),
            oy: ((ph - height * scale) / 2.0).floor(),
        }
    }

    fn x(&self, x: f64) -> i32 {
        (self.ox + x * self.scale).round() as i32
    }

    fn y(&self, y: f64) -> i32 {
        (self.oy + y * self.scale).round() as i32
    }

    /// Length in pixels, never below `min`.
    fn len(&self, v: f64, min: i32) -> i32 {
        ((v * self.scale).round() as i32).max(min)
    }
}

pub struct Scene {
    width: f64,
    height: f64,
    entity_x: f64,
    entity_w: f64,
    entity_h: f64,
    pipe_w: f64,
    entity_y: f64,
    tilt: Tilt,
    pipes: BTreeMap<ObstacleId, PipeSprite>,
    score: u32,
    best: u32,
    overlay: Overlay,
    frame: u64,
}

impl Scene {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            width: tuning.width,
            height: tuning.height,
            entity_x: tuning.entity_x,
            entity_w: tuning.entity_width,
            entity_h: tuning.entity_height,
            pipe_w: tuning.obstacle_width,
            entity_y: tuning.start_y(),
            tilt: Tilt::Level,
            pipes: BTreeMap::new(),
            score: 0,
            best: 0,
            overlay: Overlay::Start,
            frame: 0,
        }
    }

    pub fn draw(&self, buf: &mut PixelBuf) {
        let vp = Viewport::fit(buf, self.width, self.height);
        buf.clear(LETTERBOX);
        self.draw_sky(buf, &vp);
        self.draw_pipes(buf, &vp);
        self.draw_bird(buf, &vp);

        match self.overlay {
            Overlay::Start => self.draw_title(buf, &vp),
            Overlay::Playing => {
                draw_number(buf, vp.x(self.width / 2.0), vp.y(0.0) + 3, self.score, WHITE, SHADOW)
            }
            Overlay::GameOver { score } => self.draw_game_over(buf, &vp, score),
        }
    }

    fn draw_sky(&self, buf: &mut PixelBuf, vp: &Viewport) {
        let (x0, x1) = (vp.x(0.0), vp.x(self.width));
        let (y0, y1) = (vp.y(0.0), vp.y(self.height));
        let span = (y1 - y0).max(1);
        for y in y0..y1 {
            let c = Rgb::lerp(SKY_TOP, SKY_BOT, ((y - y0) * 256 / span) as u16);
            buf.fill_rect(x0, y, x1 - x0, 1, c);
        }
        // Floor line
        buf.fill_rect(x0, y1 - 1, x1 - x0, 1, GRASS);
    }

    fn draw_pipes(&self, buf: &mut PixelBuf, vp: &Viewport) {
        let pw = vp.len(self.pipe_w, 1);
        let cap_extra = vp.len(4.0, 1);
        let cap_h = vp.len(12.0, 2);
        let floor = vp.y(self.height);

        for pipe in self.pipes.values() {
            let px = vp.x(pipe.x);
            let gap_top = vp.y(pipe.top);
            let gap_bot = vp.y(self.height - pipe.bottom);

            for dx in 0..pw {
                let c = pipe_shade(dx, pw);
                buf.fill_rect(px + dx, vp.y(0.0), 1, gap_top - vp.y(0.0), c);
                buf.fill_rect(px + dx, gap_bot, 1, floor - gap_bot, c);
            }
            for dx in -cap_extra..(pw + cap_extra) {
                let c = pipe_shade(dx + cap_extra, pw + cap_extra * 2);
                buf.fill_rect(px + dx, gap_top - cap_h, 1, cap_h, c);
                buf.set(px + dx, gap_top - 1, CAP_DARK);
                buf.fill_rect(px + dx, gap_bot, 1, cap_h, c);
                buf.set(px + dx, gap_bot, CAP_DARK);
            }
        }
    }

    fn draw_bird(&self, buf: &mut PixelBuf, vp: &Viewport) {
        let x = vp.x(self.entity_x);
        let y = vp.y(self.entity_y);
        let w = vp.len(self.entity_w, 3);
        let h = vp.len(self.entity_h, 2);
        let tilt = match self.tilt {
            Tilt::Level => 0,
            Tilt::NoseUp => -1,
            Tilt::NoseDown => 1,
        };

        buf.fill_rect(x, y, w, h, BIRD_Y);
        buf.fill_rect(x + 1, y, w - 2, 1, BIRD_HI);

        let wing_y = y + h / 2 + if self.frame % 8 < 4 { -1 } else { 0 } - tilt;
        buf.fill_rect(x, wing_y, (w / 2).max(1), (h / 3).max(1), BIRD_WING);

        let eye = (w / 5).max(1);
        let (ex, ey) = (x + w - eye - 1, y + (h / 4).max(0) + tilt.min(0));
        buf.fill_rect(ex, ey, eye, eye, BIRD_EYE);
        buf.set(ex + eye - 1, ey + eye - 1, BIRD_PUPIL);

        let beak_w = (w / 4).max(1);
        let beak_h = (h / 4).max(1);
        buf.fill_rect(x + w, y + h / 2 - beak_h / 2 + tilt, beak_w, beak_h, BIRD_BEAK);
    }

    fn draw_title(&self, buf: &mut PixelBuf, vp: &Viewport) {
        let cx = vp.x(self.width / 2.0);
        let top = vp.y(self.height * 0.2);
        let char_w = vp.len(24.0, 3);
        let char_h = vp.len(36.0, 4);
        let letters = 6; // FLAPPY
        let sx = cx - letters * char_w / 2;
        for i in 0..letters {
            let bx = sx + i * char_w;
            buf.fill_rect(bx, top, char_w - 1, char_h, BIRD_Y);
            buf.fill_rect(bx, top, char_w - 1, 1, BIRD_HI);
        }

        // "SPACE TO FLAP" as one block per letter
        let sub_y = top + char_h + 4;
        let msg = "SPACE TO FLAP";
        let msg_x = cx - msg.len() as i32 * 2;
        for (i, ch) in msg.chars().enumerate() {
            if ch != ' ' {
                buf.fill_rect(msg_x + i as i32 * 4, sub_y, 3, 3, WHITE);
            }
        }

        draw_number(buf, cx, sub_y + 8, self.best, BIRD_Y, SHADOW);
    }

    fn draw_game_over(&self, buf: &mut PixelBuf, vp: &Viewport, score: u32) {
        buf.map(Rgb::halved);

        let cx = vp.x(self.width / 2.0);
        let cy = vp.y(self.height / 2.0);
        let panel_w = vp.len(200.0, 17);
        let panel_h = (DIGIT_H + 3) * 2 + 4;
        let px = cx - panel_w / 2;
        let py = cy - panel_h / 2;

        buf.fill_rect(px - 1, py - 1, panel_w + 2, panel_h + 2, SHADOW);
        buf.fill_rect(px, py, panel_w, panel_h, PANEL_EDGE);
        buf.fill_rect(px + 1, py + 1, panel_w - 2, panel_h - 2, PANEL);

        draw_number(buf, cx, py + 3, score, WHITE, SHADOW);
        draw_number(buf, cx, py + DIGIT_H + 6, self.best, BIRD_Y, SHADOW);
    }
}

impl Presenter for Scene {
    fn entity_moved(&mut self, y: f64, tilt: Tilt) {
        self.entity_y = y;
        self.tilt = tilt;
        self.frame += 1;
    }

    fn obstacle_created(&mut self, obstacle: &Obstacle) {
        self.pipes.insert(
            obstacle.id,
            PipeSprite {
                x: obstacle.x,
                top: obstacle.top_height,
                bottom: obstacle.bottom_height,
            },
        );
    }

    fn obstacle_moved(&mut self, id: ObstacleId, x: f64) {
        if let Some(pipe) = self.pipes.get_mut(&id) {
            pipe.x = x;
        }
    }

    fn obstacle_removed(&mut self, id: ObstacleId) {
        self.pipes.remove(&id);
    }

    fn score_changed(&mut self, score: u32) {
        self.score = score;
    }

    fn best_changed(&mut self, best: u32) {
        self.best = best;
    }

    fn overlay(&mut self, overlay: Overlay) {
        self.overlay = overlay;
    }
}

fn pipe_shade(x: i32, total_w: i32) -> Rgb {
    if total_w <= 1 {
        return PIPE_M;
    }
    let t = (x as f64 / (total_w - 1) as f64 * 256.0) as u16;
    match t {
        0..64 => Rgb::lerp(PIPE_L, PIPE_M, (t * 4).min(256)),
        64..100 => Rgb::lerp(PIPE_M, PIPE_HI, ((t - 64) * 7).min(256)),
        100..160 => Rgb::lerp(PIPE_HI, PIPE_R, ((t - 100) * 4).min(256)),
        _ => Rgb::lerp(PIPE_R, PIPE_L, ((t - 160) * 3).min(256)),
    }
}
