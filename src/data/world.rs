//! Host-owned world data the plugin reads.
//!
//! The host game spawns furniture and items with these components and sends
//! the messages below; the plugin never creates or mutates any of them.
use bevy::prelude::*;

/// Name of the area the player is currently in.
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentArea(pub String);

/// Area a world object belongs to.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Location(pub String);

/// A placed furniture object occupying a rectangle of world tiles.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Furniture {
    pub item_id: String,
    pub tile: IVec2,
    /// Width and height in tiles.
    pub footprint: UVec2,
}

impl Furniture {
    pub fn new(item_id: impl Into<String>, tile: IVec2, footprint: UVec2) -> Self {
        Self {
            item_id: item_id.into(),
            tile,
            footprint,
        }
    }
}

/// Items stored inside a container. Order is display order.
#[derive(Component, Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldItems(pub Vec<Entity>);

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub stack: u32,
    pub category: String,
}

/// Sprite drawn for an item inside a popup slot.
#[derive(Component, Debug, Clone)]
pub struct ItemIcon(pub Handle<Image>);

#[derive(Message, Debug, Clone, PartialEq, Eq)]
pub struct AreaChanged {
    pub area: String,
}

#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStarted;

/// A button press resolved by the host to the world tile under the cursor.
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileButtonPressed {
    pub button: MouseButton,
    pub tile: IVec2,
}
