//! Dresser item popup for Bevy games.
//!
//! [`DresserUiPlugin`] tracks dresser furniture in the home area and, when the
//! player clicks one with the trigger button, opens a scrollable grid popup of
//! the dresser's items. The host game supplies world data and input through
//! the components and messages in [`data::world`].
use bevy::prelude::*;

pub mod data;
pub mod startup;
pub mod systems;

use crate::{
    data::config::DresserUiConfig,
    startup::textures::TexturesPlugin,
    systems::{interaction::InteractionPlugin, ui::grid_popup::GridPopupPlugin},
};

#[derive(Default)]
pub struct DresserUiPlugin {
    config: Option<DresserUiConfig>,
}

impl DresserUiPlugin {
    pub fn with_config(config: DresserUiConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

impl Plugin for DresserUiPlugin {
    fn build(&self, app: &mut App) {
        let config = match &self.config {
            Some(config) => match config.validate() {
                Ok(()) => config.clone(),
                Err(error) => {
                    warn!("rejected dresser ui config: {error}; using embedded config");
                    DresserUiConfig::load()
                }
            },
            None => DresserUiConfig::load(),
        };

        app.insert_resource(config)
            .add_plugins((TexturesPlugin, InteractionPlugin, GridPopupPlugin));
    }
}
