use bevy::prelude::*;

use crate::data::config::PopupLayout;

/// Columns that fit in `available_width`, never fewer than one.
pub fn items_per_row(available_width: i32, slot_size: i32) -> usize {
    (available_width / slot_size).max(1) as usize
}

pub fn total_rows(item_count: usize, items_per_row: usize) -> usize {
    item_count.div_ceil(items_per_row)
}

/// Saturates at `i32::MAX` instead of wrapping for absurd row counts.
pub fn max_scroll(total_rows: usize, slot_size: i32, visible_height: i32) -> i32 {
    i32::try_from(total_rows)
        .unwrap_or(i32::MAX)
        .saturating_mul(slot_size)
        .saturating_sub(visible_height)
        .max(0)
}

/// Rectangle with `min` inclusive and `max` exclusive.
pub fn rect_from_origin(origin: IVec2, size: IVec2) -> IRect {
    IRect::from_corners(origin, origin + size)
}

pub fn contains_point(rect: IRect, point: IVec2) -> bool {
    point.x >= rect.min.x && point.x < rect.max.x && point.y >= rect.min.y && point.y < rect.max.y
}

/// Part of `rect` inside `clip`, or `None` when they do not overlap.
pub fn clip_rect(rect: IRect, clip: IRect) -> Option<IRect> {
    let visible = rect.intersect(clip);
    (!visible.is_empty()).then_some(visible)
}

pub fn intersects_vertically(slot: IRect, view_top: i32, view_bottom: i32) -> bool {
    slot.max.y > view_top && slot.min.y < view_bottom
}

/// Screen-space layout of a popup for one viewport size and item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub window: IRect,
    pub grid_area: IRect,
    pub title_background: IRect,
    pub close_button: IRect,
    pub slot_size: i32,
    pub items_per_row: usize,
    pub total_rows: usize,
    pub max_scroll: i32,
}

impl GridLayout {
    pub fn compute(layout: &PopupLayout, viewport: IVec2, item_count: usize) -> Self {
        let window_size = layout.window_size();
        let window_origin = (viewport - window_size) / 2;
        let window = rect_from_origin(window_origin, window_size);

        let grid_area = rect_from_origin(
            window_origin + IVec2::new(layout.insets.left, layout.insets.top),
            IVec2::new(layout.available_width(), layout.available_height()),
        );

        let title_size = IVec2::new(
            layout.title_background_width,
            layout.title_background_height,
        );
        let title_background = rect_from_origin(
            IVec2::new(
                window_origin.x + (window_size.x - title_size.x) / 2,
                window_origin.y + layout.title_offset_y,
            ),
            title_size,
        );

        let close_size = IVec2::splat(layout.close_button_size);
        let close_button = rect_from_origin(
            IVec2::new(
                window.max.x - layout.close_button_size - layout.close_button_margin,
                window_origin.y + layout.close_button_margin,
            ),
            close_size,
        );

        let items_per_row = items_per_row(grid_area.width(), layout.slot_size);
        let total_rows = total_rows(item_count, items_per_row);
        let max_scroll = max_scroll(total_rows, layout.slot_size, grid_area.height());

        Self {
            window,
            grid_area,
            title_background,
            close_button,
            slot_size: layout.slot_size,
            items_per_row,
            total_rows,
            max_scroll,
        }
    }

    /// Slot rectangle of item `index` with the grid scrolled by `scroll_offset`.
    pub fn slot_rect(&self, index: usize, scroll_offset: i32) -> IRect {
        let row = i32::try_from(index / self.items_per_row).unwrap_or(i32::MAX);
        let column = i32::try_from(index % self.items_per_row).unwrap_or(i32::MAX);
        let origin = self.grid_area.min
            + IVec2::new(
                column.saturating_mul(self.slot_size),
                row.saturating_mul(self.slot_size).saturating_sub(scroll_offset),
            );
        rect_from_origin(origin, IVec2::splat(self.slot_size))
    }

    pub fn is_visible(&self, slot: IRect) -> bool {
        intersects_vertically(slot, self.grid_area.min.y, self.grid_area.max.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn items_per_row_floors_and_never_drops_below_one() {
        assert_eq!(items_per_row(736, 64), 11);
        assert_eq!(items_per_row(704, 64), 11);
        assert_eq!(items_per_row(703, 64), 10);
        assert_eq!(items_per_row(10, 64), 1);
    }

    #[test]
    fn total_rows_rounds_up() {
        assert_eq!(total_rows(0, 11), 0);
        assert_eq!(total_rows(11, 11), 1);
        assert_eq!(total_rows(12, 11), 2);
        assert_eq!(total_rows(25, 11), 3);
    }

    #[test]
    fn max_scroll_clamps_at_zero() {
        assert_eq!(max_scroll(3, 64, 140), 52);
        assert_eq!(max_scroll(2, 64, 140), 0);
        assert_eq!(max_scroll(0, 64, 140), 0);
    }

    #[test]
    fn max_scroll_saturates_instead_of_wrapping() {
        assert_eq!(max_scroll(usize::MAX, 64, 456), i32::MAX - 456);
        assert_eq!(max_scroll(1 << 40, 64, 456), i32::MAX - 456);
        assert_eq!(max_scroll(40_000_000, 64, 456), i32::MAX - 456);
    }

    #[test]
    fn max_scroll_never_decreases_with_more_items() {
        let layout = PopupLayout::default();
        let viewport = IVec2::new(1280, 720);
        let mut previous = 0;
        for item_count in 0..200 {
            let max = GridLayout::compute(&layout, viewport, item_count).max_scroll;
            assert!(max >= previous, "max_scroll dropped at {item_count} items");
            previous = max;
        }
    }

    #[test]
    fn window_is_centred_in_viewport() {
        let layout = PopupLayout::default();
        let grid = GridLayout::compute(&layout, IVec2::new(1280, 720), 0);

        assert_eq!(grid.window.min, IVec2::new(240, 60));
        assert_eq!(grid.window.max, IVec2::new(1040, 660));
        assert_eq!(grid.grid_area.min, IVec2::new(272, 164));
        assert_eq!(grid.grid_area.width(), 736);
        assert_eq!(grid.grid_area.height(), 456);
        assert_eq!(grid.close_button.min, IVec2::new(960, 76));
        assert_eq!(grid.title_background.min, IVec2::new(512, 80));
    }

    #[test]
    fn slot_rect_follows_row_major_order_and_scroll() {
        let layout = PopupLayout::default();
        let grid = GridLayout::compute(&layout, IVec2::new(800, 600), 25);
        let origin = grid.grid_area.min;

        assert_eq!(grid.slot_rect(0, 0).min, origin);
        assert_eq!(grid.slot_rect(10, 0).min, origin + IVec2::new(640, 0));
        assert_eq!(grid.slot_rect(11, 0).min, origin + IVec2::new(0, 64));
        assert_eq!(grid.slot_rect(11, 40).min, origin + IVec2::new(0, 24));
        assert_eq!(grid.slot_rect(11, 40).size(), IVec2::splat(64));
    }

    #[test]
    fn point_containment_is_half_open() {
        let rect = rect_from_origin(IVec2::new(10, 10), IVec2::splat(4));
        assert!(contains_point(rect, IVec2::new(10, 10)));
        assert!(contains_point(rect, IVec2::new(13, 13)));
        assert!(!contains_point(rect, IVec2::new(14, 13)));
        assert!(!contains_point(rect, IVec2::new(9, 10)));
    }

    #[test]
    fn clip_rect_keeps_only_the_overlap() {
        let clip = rect_from_origin(IVec2::new(0, 0), IVec2::new(100, 100));

        let partial = rect_from_origin(IVec2::new(10, 90), IVec2::splat(64));
        assert_eq!(clip_rect(partial, clip), Some(IRect::new(10, 90, 74, 100)));

        let inside = rect_from_origin(IVec2::new(10, 10), IVec2::splat(64));
        assert_eq!(clip_rect(inside, clip), Some(inside));

        let touching = rect_from_origin(IVec2::new(10, 100), IVec2::splat(64));
        assert_eq!(clip_rect(touching, clip), None);
    }

    #[test]
    fn vertical_visibility_excludes_touching_edges() {
        let slot = rect_from_origin(IVec2::new(0, -64), IVec2::splat(64));
        assert!(!intersects_vertically(slot, 0, 100));

        let slot = rect_from_origin(IVec2::new(0, -63), IVec2::splat(64));
        assert!(intersects_vertically(slot, 0, 100));

        let slot = rect_from_origin(IVec2::new(0, 100), IVec2::splat(64));
        assert!(!intersects_vertically(slot, 0, 100));
    }
}
