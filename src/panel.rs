//! The debug panel: one mass slider per body and the two point-of-view
//! buttons, drawn in the top-right corner over the scene.
//!
//! Layout and interaction are plain functions of the surface width and the
//! pointer, so they are tested without a GPU. The panel reports what happened
//! as [`PanelEvent`]s; it never touches the simulation or the camera itself.

use glam::Vec2;
use winit::event::MouseButton;

use crate::assets::FontAtlas;
use crate::config::{BodyConfig, OrreryConfig};
use crate::controls::Slider;
use crate::draw2d::{Color, Draw2d, Rect};
use crate::input::Input;
use crate::sim::BodyRole;
use crate::view::{ButtonId, PointOfView};

const MARGIN: f32 = 12.0;
const PADDING: f32 = 10.0;
const GAP: f32 = 6.0;
const TRACK_HEIGHT: f32 = 6.0;
const HANDLE_WIDTH: f32 = 8.0;

const BACKGROUND: Color = Color::rgba(0.1, 0.1, 0.1, 0.85);
const BORDER: Color = Color::rgba(0.4, 0.4, 0.4, 1.0);
const TRACK: Color = Color::rgb(0.25, 0.25, 0.25);
const FILL: Color = Color::rgb(0.18, 0.5, 0.85);
const HANDLE: Color = Color::rgb(0.85, 0.85, 0.85);
const BUTTON: Color = Color::rgb(0.22, 0.22, 0.22);
const BUTTON_HOVER: Color = Color::rgb(0.3, 0.3, 0.3);
const BUTTON_ACTIVE: Color = Color::rgb(0.18, 0.5, 0.85);
const TEXT: Color = Color::rgb(0.92, 0.92, 0.92);
const TEXT_DIM: Color = Color::rgb(0.6, 0.6, 0.6);

/// Something the user did in the panel this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PanelEvent {
    MassChanged { body: BodyRole, mass: f64 },
    Toggle(ButtonId),
}

/// Mouse state the panel reacts to, in surface pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pointer {
    pub position: Option<Vec2>,
    pub pressed: bool,
    pub down: bool,
    pub released: bool,
}

impl Pointer {
    pub fn from_input(input: &Input) -> Self {
        Self {
            position: input.cursor(),
            pressed: input.mouse_pressed(MouseButton::Left),
            down: input.mouse_down(MouseButton::Left),
            released: input.mouse_released(MouseButton::Left),
        }
    }
}

/// Screen rectangles for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelLayout {
    pub panel: Rect,
    pub title: Vec2,
    /// Label position and slider hit area, orbiter first.
    pub sliders: [(Vec2, Rect); 2],
    /// `earth_pov` then `sun_pov`.
    pub buttons: [Rect; 2],
    pub hint: Vec2,
}

impl PanelLayout {
    pub fn compute(surface_width: f32, panel_width: f32, font_size: f32) -> Self {
        let row = (font_size * 1.6).round().max(12.0);
        let width = panel_width.min(surface_width - 2.0 * MARGIN).max(4.0 * PADDING);
        let x = (surface_width - width - MARGIN).max(0.0);
        let y = MARGIN;
        let inner_x = x + PADDING;
        let inner_w = width - 2.0 * PADDING;

        let mut cursor = y + PADDING;
        let title = Vec2::new(inner_x, cursor);
        cursor += row + GAP;

        let mut slider_row = || {
            let label = Vec2::new(inner_x, cursor);
            cursor += row;
            let track = Rect::new(inner_x, cursor, inner_w, row);
            cursor += row + GAP;
            (label, track)
        };
        let sliders = [slider_row(), slider_row()];

        let button_w = (inner_w - GAP) / 2.0;
        let button_h = row * 1.3;
        let buttons = [
            Rect::new(inner_x, cursor, button_w, button_h),
            Rect::new(inner_x + button_w + GAP, cursor, button_w, button_h),
        ];
        cursor += button_h + GAP;

        let hint = Vec2::new(inner_x, cursor);
        cursor += row + PADDING;

        Self {
            panel: Rect::new(x, y, width, cursor - y),
            title,
            sliders,
            buttons,
            hint,
        }
    }

    fn slider_index(&self, p: Vec2) -> Option<usize> {
        self.sliders.iter().position(|(_, track)| track.contains(p.x, p.y))
    }

    fn button_at(&self, p: Vec2) -> Option<ButtonId> {
        self.buttons
            .iter()
            .zip(ButtonId::ALL)
            .find(|(rect, _)| rect.contains(p.x, p.y))
            .map(|(_, id)| id)
    }
}

/// Track fraction under `x`.
fn track_fraction(track: &Rect, x: f32) -> f64 {
    if track.w <= 0.0 {
        return 0.0;
    }
    f64::from((x - track.x) / track.w).clamp(0.0, 1.0)
}

/// The debug panel.
pub struct Panel {
    sliders: [(BodyRole, Slider); 2],
    panel_width: f32,
    font_size: f32,
    dragging: Option<usize>,
    hovered: bool,
    layout: PanelLayout,
}

impl Panel {
    pub fn new(config: &OrreryConfig) -> Self {
        let slider = |body: &BodyConfig| {
            Slider::new(format!("{} mass", body.name), body.mass_range, body.mass)
        };
        Self {
            sliders: [
                (BodyRole::Orbiter, slider(&config.orbiter)),
                (BodyRole::Primary, slider(&config.primary)),
            ],
            panel_width: config.ui.panel_width,
            font_size: config.ui.font_size,
            dragging: None,
            hovered: false,
            layout: PanelLayout::compute(0.0, config.ui.panel_width, config.ui.font_size),
        }
    }

    pub fn slider(&self, body: BodyRole) -> &Slider {
        let index = self.sliders.iter().position(|(role, _)| *role == body).unwrap_or(0);
        &self.sliders[index].1
    }

    pub fn layout(&self) -> &PanelLayout {
        &self.layout
    }

    /// True while the panel owns the mouse: the cursor is over it or a slider
    /// drag is in progress.
    pub fn captures_pointer(&self) -> bool {
        self.hovered || self.dragging.is_some()
    }

    /// Process this frame's pointer state.
    pub fn update(&mut self, pointer: Pointer, surface_width: f32) -> Vec<PanelEvent> {
        self.layout = PanelLayout::compute(surface_width, self.panel_width, self.font_size);
        let mut events = Vec::new();

        self.hovered = pointer
            .position
            .is_some_and(|p| self.layout.panel.contains(p.x, p.y));

        if pointer.pressed {
            if let Some(p) = pointer.position {
                if let Some(index) = self.layout.slider_index(p) {
                    self.dragging = Some(index);
                } else if let Some(button) = self.layout.button_at(p) {
                    tracing::debug!(%button, "panel button pressed");
                    events.push(PanelEvent::Toggle(button));
                }
            }
        }

        if let (Some(index), Some(p)) = (self.dragging, pointer.position) {
            if pointer.down || pointer.pressed || pointer.released {
                let track = self.layout.sliders[index].1;
                let (body, slider) = &mut self.sliders[index];
                let target = slider.value_at_fraction(track_fraction(&track, p.x));
                if let Some(mass) = slider.set(target) {
                    events.push(PanelEvent::MassChanged { body: *body, mass });
                }
            }
        }

        if pointer.released || (!pointer.down && !pointer.pressed) {
            self.dragging = None;
        }

        events
    }

    /// Queue the panel's quads and text.
    pub fn draw(
        &self,
        draw: &mut Draw2d,
        font: Option<&FontAtlas>,
        pov: PointOfView,
        paused: bool,
        hover: Option<Vec2>,
    ) {
        let layout = &self.layout;
        draw.rect(layout.panel, BORDER);
        draw.rect(layout.panel.inset(1.0), BACKGROUND);

        for ((_, track), (_, slider)) in layout.sliders.iter().zip(&self.sliders) {
            let bar_y = track.y + (track.h - TRACK_HEIGHT) / 2.0;
            let bar = Rect::new(track.x, bar_y, track.w, TRACK_HEIGHT);
            let filled = bar.w * slider.fraction() as f32;
            draw.rect(bar, TRACK);
            draw.rect(Rect::new(bar.x, bar.y, filled, bar.h), FILL);

            let handle_x = (bar.x + filled - HANDLE_WIDTH / 2.0)
                .clamp(bar.x, bar.right() - HANDLE_WIDTH);
            draw.rect(Rect::new(handle_x, track.y + 2.0, HANDLE_WIDTH, track.h - 4.0), HANDLE);
        }

        for (rect, id) in layout.buttons.iter().zip(ButtonId::ALL) {
            let hovered = hover.is_some_and(|p| rect.contains(p.x, p.y));
            let fill = if pov.is_active(id) {
                BUTTON_ACTIVE
            } else if hovered {
                BUTTON_HOVER
            } else {
                BUTTON
            };
            draw.rect(*rect, fill);
        }

        let Some(font) = font else {
            return;
        };

        let title = if paused { "orrery (paused)" } else { "orrery" };
        draw.text(font, layout.title.x, layout.title.y, title, TEXT);

        for ((label, track), (_, slider)) in layout.sliders.iter().zip(&self.sliders) {
            draw.text(font, label.x, label.y, &slider.label, TEXT_DIM);
            let value = slider.display_value();
            let value_x = track.right() - font.measure(&value);
            draw.text(font, value_x, label.y, &value, TEXT);
        }

        for (rect, id) in layout.buttons.iter().zip(ButtonId::ALL) {
            let text = id.as_str();
            let x = rect.x + (rect.w - font.measure(text)) / 2.0;
            let y = rect.y + (rect.h - font.line_height()) / 2.0;
            draw.text(font, x, y, text, TEXT);
        }

        draw.text(font, layout.hint.x, layout.hint.y, "E/S view  Space pause", TEXT_DIM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDTH: f32 = 1280.0;

    fn panel() -> Panel {
        let mut panel = Panel::new(&OrreryConfig::default());
        panel.update(Pointer::default(), WIDTH);
        panel
    }

    fn press(p: Vec2) -> Pointer {
        Pointer {
            position: Some(p),
            pressed: true,
            down: true,
            released: false,
        }
    }

    fn hold(p: Vec2) -> Pointer {
        Pointer {
            position: Some(p),
            pressed: false,
            down: true,
            released: false,
        }
    }

    fn center(rect: Rect) -> Vec2 {
        Vec2::new(rect.x + rect.w / 2.0, rect.y + rect.h / 2.0)
    }

    #[test]
    fn layout_sits_in_top_right_corner() {
        let layout = PanelLayout::compute(WIDTH, 260.0, 15.0);
        assert_eq!(layout.panel.right(), WIDTH - MARGIN);
        assert_eq!(layout.panel.y, MARGIN);
        for (_, track) in layout.sliders {
            assert!(track.x >= layout.panel.x && track.right() <= layout.panel.right());
            assert!(track.bottom() <= layout.panel.bottom());
        }
        assert!(layout.buttons[0].right() < layout.buttons[1].x);
    }

    #[test]
    fn narrow_window_still_fits() {
        let layout = PanelLayout::compute(200.0, 260.0, 15.0);
        assert!(layout.panel.x >= 0.0);
        assert!(layout.panel.right() <= 200.0);
    }

    #[test]
    fn clicking_track_end_sets_maximum() {
        let mut panel = panel();
        let track = panel.layout().sliders[0].1;
        let events = panel.update(press(Vec2::new(track.right() - 0.01, track.y + 1.0)), WIDTH);

        assert_eq!(
            events,
            vec![PanelEvent::MassChanged {
                body: BodyRole::Orbiter,
                mass: 20.0
            }]
        );
        assert!(panel.captures_pointer());
    }

    #[test]
    fn drag_outside_track_clamps_to_minimum() {
        let mut panel = panel();
        let track = panel.layout().sliders[1].1;
        panel.update(press(center(track)), WIDTH);
        let events = panel.update(hold(Vec2::new(0.0, 500.0)), WIDTH);

        assert_eq!(
            events,
            vec![PanelEvent::MassChanged {
                body: BodyRole::Primary,
                mass: 0.0
            }]
        );
        assert!(panel.captures_pointer());
        assert_eq!(panel.slider(BodyRole::Primary).value(), 0.0);
    }

    #[test]
    fn unchanged_value_emits_nothing() {
        let mut panel = panel();
        let track = panel.layout().sliders[0].1;
        let p = Vec2::new(track.x + track.w * 0.25, track.y + 1.0);
        assert_eq!(panel.update(press(p), WIDTH).len(), 1);
        assert!(panel.update(hold(p), WIDTH).is_empty());
    }

    #[test]
    fn release_ends_drag() {
        let mut panel = panel();
        let track = panel.layout().sliders[0].1;
        panel.update(press(center(track)), WIDTH);

        let outside = Vec2::new(10.0, 600.0);
        panel.update(
            Pointer {
                position: Some(outside),
                pressed: false,
                down: false,
                released: true,
            },
            WIDTH,
        );
        assert!(!panel.captures_pointer());
        assert!(panel.update(hold(outside), WIDTH).is_empty());
    }

    #[test]
    fn buttons_toggle() {
        let mut panel = panel();
        let [earth, sun] = panel.layout().buttons;

        assert_eq!(
            panel.update(press(center(earth)), WIDTH),
            vec![PanelEvent::Toggle(ButtonId::EarthPov)]
        );
        assert_eq!(
            panel.update(press(center(sun)), WIDTH),
            vec![PanelEvent::Toggle(ButtonId::SunPov)]
        );
        // Holding does not repeat.
        assert!(panel.update(hold(center(sun)), WIDTH).is_empty());
    }

    #[test]
    fn sliders_start_at_the_simulated_masses() {
        let mut panel = panel();
        assert_eq!(panel.slider(BodyRole::Orbiter).display_value(), "5.9724");
        assert_eq!(panel.slider(BodyRole::Primary).display_value(), "1988500");
        assert!(panel.update(Pointer::default(), WIDTH).is_empty());
    }

    #[test]
    fn clicks_outside_are_ignored() {
        let mut panel = panel();
        let events = panel.update(press(Vec2::new(100.0, 400.0)), WIDTH);

        assert!(events.is_empty());
        assert!(!panel.captures_pointer());
    }

    #[test]
    fn hovering_captures_pointer() {
        let mut panel = panel();
        let p = center(panel.layout().panel);
        panel.update(
            Pointer {
                position: Some(p),
                ..Pointer::default()
            },
            WIDTH,
        );
        assert!(panel.captures_pointer());
    }
}
