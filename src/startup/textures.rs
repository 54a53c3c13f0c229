use bevy::prelude::*;
use enum_map::EnumMap;

use crate::{data::config::DresserUiConfig, systems::ui::grid_popup::ChromeTexture};

pub struct TexturesPlugin;
impl Plugin for TexturesPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ChromeTextures>()
            .add_systems(Startup, ChromeTextures::load);
    }
}

/// Popup art. Textures without a handle are drawn as flat colour.
#[derive(Resource, Default, Debug, Clone)]
pub struct ChromeTextures(EnumMap<ChromeTexture, Option<Handle<Image>>>);

impl ChromeTextures {
    pub fn get(&self, texture: ChromeTexture) -> Option<Handle<Image>> {
        self.0[texture].clone()
    }

    pub fn insert(&mut self, texture: ChromeTexture, image: Handle<Image>) {
        self.0[texture] = Some(image);
    }

    fn load(
        asset_server: Option<Res<AssetServer>>,
        config: Res<DresserUiConfig>,
        mut textures: ResMut<ChromeTextures>,
    ) {
        let paths = [
            (ChromeTexture::TitleBackground, &config.assets.title_background),
            (ChromeTexture::CloseButton, &config.assets.close_button),
            (ChromeTexture::SlotBackground, &config.assets.slot_background),
        ];
        if paths.iter().all(|(_, path)| path.is_none()) {
            return;
        }
        let Some(asset_server) = asset_server else {
            warn!("no asset server available; popup chrome falls back to flat colours");
            return;
        };

        for (texture, path) in paths {
            if let Some(path) = path {
                textures.insert(texture, asset_server.load(path.clone()));
            }
        }
    }
}
