use bevy::{prelude::*, window::PrimaryWindow};

use dresser_ui::{
    data::world::{
        AreaChanged, CurrentArea, DayStarted, Furniture, HeldItems, Item, Location,
        TileButtonPressed,
    },
    systems::interaction::InteractionSystem,
    DresserUiPlugin,
};

const HOME_AREA: &str = "FarmHouse";
const TILE_PX: f32 = 64.0;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(DresserUiPlugin::default())
        .insert_resource(CurrentArea(HOME_AREA.to_string()))
        .add_systems(Startup, (setup, furnish_farmhouse, start_day).chain())
        .add_systems(
            Update,
            report_tile_presses.before(InteractionSystem::Refresh),
        )
        .run();
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn furnish_farmhouse(mut commands: Commands) {
    let outfits = [
        ("Shirt", "Clothing"),
        ("Overalls", "Clothing"),
        ("Cowboy Hat", "Hat"),
        ("Leather Boots", "Boots"),
        ("Amethyst Ring", "Ring"),
    ];
    let oak_items: Vec<Entity> = outfits
        .iter()
        .cycle()
        .take(40)
        .map(|(name, category)| {
            commands
                .spawn(Item {
                    name: name.to_string(),
                    stack: 1,
                    category: category.to_string(),
                })
                .id()
        })
        .collect();

    let furniture = [
        (
            Furniture::new("Oak Dresser", IVec2::new(-6, -3), UVec2::new(2, 1)),
            HeldItems(oak_items),
            Color::srgb(0.55, 0.35, 0.2),
        ),
        (
            Furniture::new("Birch Dresser", IVec2::new(3, -3), UVec2::new(2, 1)),
            HeldItems::default(),
            Color::srgb(0.85, 0.75, 0.55),
        ),
        (
            Furniture::new("Double Bed", IVec2::new(-1, 1), UVec2::new(2, 3)),
            HeldItems::default(),
            Color::srgb(0.3, 0.4, 0.7),
        ),
    ];

    for (furniture, held, color) in furniture {
        let size = furniture.footprint.as_vec2() * TILE_PX;
        let top_left = furniture.tile.as_vec2() * TILE_PX;
        let center = Vec2::new(top_left.x + size.x * 0.5, -(top_left.y + size.y * 0.5));
        commands.spawn((
            Sprite::from_color(color, size),
            Transform::from_translation(center.extend(0.0)),
            Location(HOME_AREA.to_string()),
            furniture,
            held,
        ));
    }
}

fn start_day(mut area_changed: MessageWriter<AreaChanged>, mut day_started: MessageWriter<DayStarted>) {
    area_changed.write(AreaChanged {
        area: HOME_AREA.to_string(),
    });
    day_started.write(DayStarted);
}

/// Resolves fresh button presses to the world tile under the cursor.
fn report_tile_presses(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut presses: MessageWriter<TileButtonPressed>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };

    let tile = IVec2::new(
        (world.x / TILE_PX).floor() as i32,
        (-world.y / TILE_PX).floor() as i32,
    );
    for &button in mouse.get_just_pressed() {
        presses.write(TileButtonPressed { button, tile });
    }
}
