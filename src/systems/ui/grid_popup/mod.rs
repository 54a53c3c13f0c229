//! Modal popup showing a container's items in a scrollable grid.
//!
//! `GridPopup` owns layout and scroll state and renders through a
//! [`PopupCanvas`]. The systems in this module are the Bevy-side adapter: they
//! feed it the window size, wheel input and close clicks, and turn its draw
//! calls into sprite and text entities.
use bevy::{input::mouse::MouseWheel, prelude::*, window::PrimaryWindow};

use crate::data::config::{DresserUiConfig, PopupLayout};

mod canvas;
mod geometry;
mod render;

pub use self::canvas::{ChromeTexture, DrawCommand, DrawList, PopupCanvas};
pub use self::geometry::GridLayout;
pub use self::render::PopupDrawn;

use self::geometry::contains_point;
use self::render::{draw_grid_popups, pin_popups_to_camera};

const BACKDROP_ALPHA: f32 = 0.7;
const TITLE_COLOR: Color = Color::srgb(0.34, 0.13, 0.07);
pub const POPUP_Z: f32 = 500.0;

pub struct GridPopupPlugin;
impl Plugin for GridPopupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PopupCursor>()
            .add_message::<AssetEvent<Image>>()
            .add_systems(
                Update,
                (
                    PopupCursor::update_position,
                    GridPopup::sync_viewport,
                    GridPopup::scroll,
                    GridPopup::close,
                    pin_popups_to_camera,
                    draw_grid_popups,
                )
                    .chain(),
            );
    }
}

/// Capabilities a host overlay adapter drives every frame.
pub trait PopupOverlay {
    /// Positive `direction` scrolls up, negative scrolls down. Returns whether
    /// the offset moved.
    fn on_scroll(&mut self, direction: i32) -> bool;
    fn on_draw(&self, canvas: &mut dyn PopupCanvas);
    fn hit_test_close(&self, point: IVec2) -> bool;
}

/// Vertical scroll offset, always within `0..=max_offset`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset_px: i32,
    max_offset: i32,
}

impl ScrollState {
    pub fn offset(&self) -> i32 {
        self.offset_px
    }

    pub fn max_offset(&self) -> i32 {
        self.max_offset
    }

    pub fn set_max_offset(&mut self, max_offset: i32) {
        self.max_offset = max_offset.max(0);
        self.offset_px = self.offset_px.clamp(0, self.max_offset);
    }

    pub fn scroll(&mut self, direction: i32, step: i32) -> bool {
        let target = match direction.signum() {
            1 => self.offset_px - step,
            -1 => self.offset_px + step,
            _ => return false,
        };
        let clamped = target.clamp(0, self.max_offset);
        let moved = clamped != self.offset_px;
        self.offset_px = clamped;
        moved
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub index: usize,
    pub row: usize,
    pub column: usize,
    pub rect: IRect,
}

/// Cursor position in screen pixels (origin top-left, y down).
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PopupCursor {
    pub position: Option<IVec2>,
}

impl PopupCursor {
    fn update_position(
        windows: Query<&Window, With<PrimaryWindow>>,
        mut cursor: ResMut<PopupCursor>,
    ) {
        if let Ok(window) = windows.single() {
            cursor.position = window.cursor_position().map(|position| position.as_ivec2());
        }
    }
}

#[derive(Component, Debug, Clone)]
#[require(Transform, Visibility)]
pub struct GridPopup {
    title: String,
    items: Vec<Entity>,
    config: PopupLayout,
    viewport: IVec2,
    layout: GridLayout,
    scroll: ScrollState,
}

impl GridPopup {
    /// # Panics
    ///
    /// If the grid area of `config` is narrower than one slot.
    pub fn new(
        title: impl Into<String>,
        items: Vec<Entity>,
        config: PopupLayout,
        viewport: IVec2,
    ) -> Self {
        assert!(
            config.slot_size > 0 && config.available_width() >= config.slot_size,
            "popup grid is {}px wide, narrower than one {}px slot",
            config.available_width(),
            config.slot_size
        );

        let layout = GridLayout::compute(&config, viewport, items.len());
        let mut scroll = ScrollState::default();
        scroll.set_max_offset(layout.max_scroll);

        Self {
            title: title.into(),
            items,
            config,
            viewport,
            layout,
            scroll,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[Entity] {
        &self.items
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn viewport(&self) -> IVec2 {
        self.viewport
    }

    pub fn scroll_offset(&self) -> i32 {
        self.scroll.offset()
    }

    pub fn max_scroll(&self) -> i32 {
        self.scroll.max_offset()
    }

    pub fn items_per_row(&self) -> usize {
        self.layout.items_per_row
    }

    pub fn total_rows(&self) -> usize {
        self.layout.total_rows
    }

    pub fn close_region(&self) -> IRect {
        self.layout.close_button
    }

    /// Returns whether the layout changed.
    pub fn set_viewport(&mut self, viewport: IVec2) -> bool {
        if viewport == self.viewport {
            return false;
        }
        self.viewport = viewport;
        self.relayout();
        true
    }

    pub fn set_items(&mut self, items: Vec<Entity>) {
        let count_changed = items.len() != self.items.len();
        self.items = items;
        if count_changed {
            self.relayout();
        }
    }

    fn relayout(&mut self) {
        self.layout = GridLayout::compute(&self.config, self.viewport, self.items.len());
        self.scroll.set_max_offset(self.layout.max_scroll);
    }

    pub fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        let per_row = self.layout.items_per_row;
        (0..self.items.len()).map(move |index| Slot {
            index,
            row: index / per_row,
            column: index % per_row,
            rect: self.layout.slot_rect(index, self.scroll.offset()),
        })
    }

    pub fn visible_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.slots().filter(|slot| self.layout.is_visible(slot.rect))
    }

    /// Index of the item whose slot is under `point`, if it is inside the grid area.
    pub fn slot_at(&self, point: IVec2) -> Option<usize> {
        if !contains_point(self.layout.grid_area, point) {
            return None;
        }
        self.visible_slots()
            .find(|slot| contains_point(slot.rect, point))
            .map(|slot| slot.index)
    }

    fn draw_chrome(&self, canvas: &mut dyn PopupCanvas) {
        let layout = &self.layout;
        canvas.draw_textured_rect(ChromeTexture::DialogBox, layout.window, Color::WHITE);
        canvas.draw_textured_rect(
            ChromeTexture::GridBackdrop,
            layout.grid_area,
            Color::BLACK.with_alpha(BACKDROP_ALPHA),
        );
        canvas.draw_textured_rect(
            ChromeTexture::TitleBackground,
            layout.title_background,
            Color::WHITE,
        );

        let title_size = canvas.measure_text(&self.title);
        let title_position = IVec2::new(
            layout.window.min.x + (layout.window.width() - title_size.x) / 2,
            layout.title_background.min.y + (layout.title_background.height() - title_size.y) / 2,
        );
        canvas.draw_text(&self.title, title_position, TITLE_COLOR);

        canvas.draw_textured_rect(ChromeTexture::CloseButton, layout.close_button, Color::WHITE);
    }

    fn sync_viewport(
        config: Res<DresserUiConfig>,
        windows: Query<&Window, With<PrimaryWindow>>,
        mut popups: Query<&mut GridPopup>,
    ) {
        let viewport = viewport_size(&windows, &config);
        for mut popup in popups.iter_mut() {
            if popup.viewport() != viewport {
                popup.set_viewport(viewport);
            }
        }
    }

    fn scroll(mut wheel: MessageReader<MouseWheel>, mut popups: Query<&mut GridPopup>) {
        for event in wheel.read() {
            let direction = if event.y > 0.0 {
                1
            } else if event.y < 0.0 {
                -1
            } else {
                continue;
            };

            for mut popup in popups.iter_mut() {
                if popup.bypass_change_detection().on_scroll(direction) {
                    popup.set_changed();
                }
            }
        }
    }

    fn close(
        mut commands: Commands,
        cursor: Res<PopupCursor>,
        mouse: Res<ButtonInput<MouseButton>>,
        keyboard: Res<ButtonInput<KeyCode>>,
        popups: Query<(Entity, &GridPopup)>,
    ) {
        let clicked = mouse.just_pressed(MouseButton::Left);
        let escaped = keyboard.just_pressed(KeyCode::Escape);
        if !clicked && !escaped {
            return;
        }

        for (entity, popup) in popups.iter() {
            let close_clicked =
                clicked && cursor.position.is_some_and(|point| popup.hit_test_close(point));
            if close_clicked || escaped {
                info!("closing `{}` popup", popup.title());
                commands.entity(entity).despawn();
            }
        }
    }
}

impl PopupOverlay for GridPopup {
    fn on_scroll(&mut self, direction: i32) -> bool {
        self.scroll.scroll(direction, self.config.pixels_per_scroll)
    }

    fn on_draw(&self, canvas: &mut dyn PopupCanvas) {
        self.draw_chrome(canvas);

        // Rows straddling the grid edge are cut at the grid area.
        canvas.set_clip(Some(self.layout.grid_area));
        for slot in self.visible_slots() {
            canvas.draw_textured_rect(ChromeTexture::SlotBackground, slot.rect, Color::WHITE);
            canvas.draw_item(self.items[slot.index], slot.rect);
        }
        canvas.set_clip(None);
    }

    fn hit_test_close(&self, point: IVec2) -> bool {
        contains_point(self.layout.close_button, point)
    }
}

/// Logical size of the primary window, or the configured fallback.
pub fn viewport_size(
    windows: &Query<&Window, With<PrimaryWindow>>,
    config: &DresserUiConfig,
) -> IVec2 {
    windows
        .single()
        .map(|window| window.size().as_ivec2())
        .unwrap_or_else(|_| config.fallback_viewport())
}
