use bevy::prelude::*;
use enum_map::Enum;

#[derive(Enum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChromeTexture {
    DialogBox,
    GridBackdrop,
    TitleBackground,
    CloseButton,
    SlotBackground,
}

/// Draw primitives a popup renders through. Rectangles are in screen pixels,
/// origin top-left, y down.
pub trait PopupCanvas {
    /// Restricts later rect and item draws to `clip`. `None` lifts the limit.
    fn set_clip(&mut self, clip: Option<IRect>);
    fn draw_textured_rect(&mut self, texture: ChromeTexture, dest: IRect, tint: Color);
    fn draw_text(&mut self, text: &str, position: IVec2, color: Color);
    fn measure_text(&self, text: &str) -> IVec2;
    fn draw_item(&mut self, item: Entity, dest: IRect);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    TexturedRect {
        texture: ChromeTexture,
        dest: IRect,
        clip: Option<IRect>,
        tint: Color,
    },
    Text {
        text: String,
        position: IVec2,
        color: Color,
    },
    Item {
        item: Entity,
        dest: IRect,
        clip: Option<IRect>,
    },
}

/// Records draw calls in order. Text is measured as a single line of
/// fixed-advance glyphs sized from the font size.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    pub font_size: f32,
    clip: Option<IRect>,
}

impl DrawList {
    const GLYPH_ADVANCE: f32 = 0.6;

    pub fn new(font_size: f32) -> Self {
        Self {
            commands: Vec::new(),
            font_size,
            clip: None,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = (Entity, IRect)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Item { item, dest, .. } => Some((*item, *dest)),
            _ => None,
        })
    }

    pub fn count_texture(&self, texture: ChromeTexture) -> usize {
        self.commands
            .iter()
            .filter(|command| {
                matches!(command, DrawCommand::TexturedRect { texture: t, .. } if *t == texture)
            })
            .count()
    }
}

impl PopupCanvas for DrawList {
    fn set_clip(&mut self, clip: Option<IRect>) {
        self.clip = clip;
    }

    fn draw_textured_rect(&mut self, texture: ChromeTexture, dest: IRect, tint: Color) {
        self.commands.push(DrawCommand::TexturedRect {
            texture,
            dest,
            clip: self.clip,
            tint,
        });
    }

    fn draw_text(&mut self, text: &str, position: IVec2, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            position,
            color,
        });
    }

    fn measure_text(&self, text: &str) -> IVec2 {
        let width = text.chars().count() as f32 * self.font_size * Self::GLYPH_ADVANCE;
        IVec2::new(width.round() as i32, self.font_size.round() as i32)
    }

    fn draw_item(&mut self, item: Entity, dest: IRect) {
        self.commands.push(DrawCommand::Item {
            item,
            dest,
            clip: self.clip,
        });
    }
}
