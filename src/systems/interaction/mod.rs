//! Container interaction: keeps the detector's cache in step with the home
//! area and opens a [`GridPopup`] when the trigger button lands on a tracked
//! container.
use bevy::{prelude::*, window::PrimaryWindow};

use crate::{
    data::{
        config::DresserUiConfig,
        world::{
            AreaChanged, CurrentArea, DayStarted, Furniture, HeldItems, Item, Location,
            TileButtonPressed,
        },
    },
    systems::ui::grid_popup::{viewport_size, GridPopup, POPUP_Z},
};

pub mod detector;

pub use self::detector::{InteractionDetector, TrackedContainer, WorldObject};

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum InteractionSystem {
    Refresh,
    Detect,
    SyncContents,
}

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        let config = app
            .world()
            .get_resource::<DresserUiConfig>()
            .cloned()
            .unwrap_or_default();

        app.add_message::<AreaChanged>()
            .add_message::<DayStarted>()
            .add_message::<TileButtonPressed>()
            .init_resource::<CurrentArea>()
            .insert_resource(InteractionDetector::new(
                config.detector.home_area,
                &config.detector.keyword,
            ))
            .add_systems(
                Update,
                (
                    refresh_tracked_containers.in_set(InteractionSystem::Refresh),
                    detect_container_interaction
                        .in_set(InteractionSystem::Detect)
                        .after(InteractionSystem::Refresh),
                    sync_popup_contents
                        .in_set(InteractionSystem::SyncContents)
                        .after(InteractionSystem::Detect),
                ),
            );
    }
}

/// Container whose contents an open popup shows.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupSource(pub Entity);

fn refresh_tracked_containers(
    mut area_changed: MessageReader<AreaChanged>,
    mut day_started: MessageReader<DayStarted>,
    config: Res<DresserUiConfig>,
    mut current_area: ResMut<CurrentArea>,
    furniture: Query<(Entity, &Furniture, &Location)>,
    mut detector: ResMut<InteractionDetector>,
) {
    let mut areas: Vec<String> = Vec::new();
    for message in area_changed.read() {
        if current_area.0 != message.area {
            current_area.0 = message.area.clone();
        }
        areas.push(message.area.clone());
    }

    let detector_config = &config.detector;
    if config.is_changed()
        && !detector.is_configured_for(&detector_config.home_area, &detector_config.keyword)
    {
        info!(
            "tracking `{}` furniture in {}",
            detector_config.keyword, detector_config.home_area
        );
        *detector =
            InteractionDetector::new(detector_config.home_area.clone(), &detector_config.keyword);
        areas.push(current_area.0.clone());
    } else if day_started.read().count() > 0 {
        areas.push(current_area.0.clone());
    }
    day_started.clear();

    for area in areas {
        let objects = furniture
            .iter()
            .filter(|(_, _, location)| location.0 == area)
            .map(|(entity, furniture, _)| WorldObject {
                entity,
                identity: &furniture.item_id,
                tile: furniture.tile,
                footprint: furniture.footprint,
            });

        if detector.bypass_change_detection().refresh(&area, objects) {
            detector.set_changed();
        }
    }
}

fn detect_container_interaction(
    mut commands: Commands,
    mut presses: MessageReader<TileButtonPressed>,
    config: Res<DresserUiConfig>,
    detector: Res<InteractionDetector>,
    mut mouse: ResMut<ButtonInput<MouseButton>>,
    containers: Query<&HeldItems>,
    items: Query<&Item>,
    windows: Query<&Window, With<PrimaryWindow>>,
    open_popups: Query<(), With<GridPopup>>,
    current_area: Res<CurrentArea>,
) {
    let trigger = MouseButton::from(config.detector.trigger);
    // The cache is only meaningful inside the home area, and the popup is
    // modal: world clicks do nothing while one is open.
    if current_area.0 != detector.home_area() || !open_popups.is_empty() || detector.is_empty()
    {
        presses.clear();
        return;
    }

    for press in presses.read() {
        if press.button != trigger {
            continue;
        }
        let Some(hit) = detector.hit_test(press.tile) else {
            continue;
        };

        debug!(
            "container interaction detected on {:?} at tile {}",
            hit.container, press.tile
        );
        mouse.clear_just_pressed(trigger);

        let held = containers
            .get(hit.container)
            .map(|held| held.0.clone())
            .unwrap_or_default();
        for item in held.iter().filter_map(|&item| items.get(item).ok()) {
            debug!("{} x{} ({})", item.name, item.stack, item.category);
        }

        info!(
            "opening `{}` popup with {} item(s)",
            config.popup.title,
            held.len()
        );
        let popup = GridPopup::new(
            config.popup.title.clone(),
            held,
            config.popup.clone(),
            viewport_size(&windows, &config),
        );
        commands.spawn((
            popup,
            PopupSource(hit.container),
            Transform::from_xyz(0.0, 0.0, POPUP_Z),
        ));
        break;
    }
    presses.clear();
}

fn sync_popup_contents(
    containers: Query<Ref<HeldItems>>,
    mut popups: Query<(&mut GridPopup, &PopupSource)>,
) {
    for (mut popup, source) in popups.iter_mut() {
        let Ok(held) = containers.get(source.0) else {
            continue;
        };
        if held.is_changed() && popup.items() != held.0.as_slice() {
            popup.set_items(held.0.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_interaction_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.init_resource::<ButtonInput<MouseButton>>();
        app.insert_resource(DresserUiConfig::default());
        app.add_plugins(InteractionPlugin);
        app
    }

    fn spawn_item(app: &mut App, name: &str) -> Entity {
        app.world_mut()
            .spawn(Item {
                name: name.to_string(),
                stack: 1,
                category: String::from("Clothing"),
            })
            .id()
    }

    fn spawn_furniture(
        app: &mut App,
        item_id: &str,
        area: &str,
        tile: IVec2,
        footprint: UVec2,
        items: Vec<Entity>,
    ) -> Entity {
        app.world_mut()
            .spawn((
                Furniture::new(item_id, tile, footprint),
                Location(area.to_string()),
                HeldItems(items),
            ))
            .id()
    }

    fn enter_area(app: &mut App, area: &str) {
        app.world_mut().write_message(AreaChanged {
            area: area.to_string(),
        });
        app.update();
    }

    fn press(app: &mut App, button: MouseButton, tile: IVec2) {
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(button);
        app.world_mut()
            .write_message(TileButtonPressed { button, tile });
        app.update();
    }

    fn open_popups(app: &mut App) -> Vec<(Entity, GridPopup, PopupSource)> {
        let mut query = app
            .world_mut()
            .query::<(Entity, &GridPopup, &PopupSource)>();
        query
            .iter(app.world())
            .map(|(entity, popup, source)| (entity, popup.clone(), *source))
            .collect()
    }

    #[test]
    fn area_change_to_home_tracks_dressers_only() {
        let mut app = make_interaction_test_app();
        let dresser = spawn_furniture(
            &mut app,
            "Oak Dresser",
            "FarmHouse",
            IVec2::new(10, 5),
            UVec2::new(2, 1),
            Vec::new(),
        );
        spawn_furniture(
            &mut app,
            "Double Bed",
            "FarmHouse",
            IVec2::new(2, 2),
            UVec2::new(2, 3),
            Vec::new(),
        );
        spawn_furniture(
            &mut app,
            "Dresser",
            "Cellar",
            IVec2::new(0, 0),
            UVec2::new(2, 1),
            Vec::new(),
        );

        enter_area(&mut app, "FarmHouse");

        let detector = app.world().resource::<InteractionDetector>();
        let tracked: Vec<Entity> = detector.tracked().iter().map(|c| c.container).collect();
        assert_eq!(tracked, vec![dresser]);
    }

    #[test]
    fn leaving_home_keeps_previous_cache() {
        let mut app = make_interaction_test_app();
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(10, 5),
            UVec2::new(2, 1),
            Vec::new(),
        );
        enter_area(&mut app, "FarmHouse");
        let before = app.world().resource::<InteractionDetector>().clone();

        enter_area(&mut app, "Town");

        assert_eq!(*app.world().resource::<InteractionDetector>(), before);
    }

    #[test]
    fn day_start_refreshes_current_area() {
        let mut app = make_interaction_test_app();
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(1, 1),
            UVec2::new(1, 1),
            Vec::new(),
        );
        app.insert_resource(CurrentArea(String::from("FarmHouse")));

        app.world_mut().write_message(DayStarted);
        app.update();

        assert_eq!(app.world().resource::<InteractionDetector>().tracked().len(), 1);
    }

    #[test]
    fn area_change_updates_current_area() {
        let mut app = make_interaction_test_app();

        enter_area(&mut app, "Town");

        assert_eq!(app.world().resource::<CurrentArea>().0, "Town");
    }

    #[test]
    fn click_outside_home_area_is_ignored() {
        let mut app = make_interaction_test_app();
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(10, 5),
            UVec2::new(2, 1),
            Vec::new(),
        );
        enter_area(&mut app, "FarmHouse");
        enter_area(&mut app, "Town");

        press(&mut app, MouseButton::Right, IVec2::new(10, 5));

        assert!(open_popups(&mut app).is_empty());
        assert!(app
            .world()
            .resource::<ButtonInput<MouseButton>>()
            .just_pressed(MouseButton::Right));
    }

    #[test]
    fn detector_is_rebuilt_when_config_changes() {
        let mut app = make_interaction_test_app();
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(0, 0),
            UVec2::new(1, 1),
            Vec::new(),
        );
        let wardrobe = spawn_furniture(
            &mut app,
            "Pine Wardrobe",
            "FarmHouse",
            IVec2::new(4, 0),
            UVec2::new(1, 1),
            Vec::new(),
        );
        enter_area(&mut app, "FarmHouse");

        app.world_mut()
            .resource_mut::<DresserUiConfig>()
            .detector
            .keyword = String::from("Wardrobe");
        app.update();

        let detector = app.world().resource::<InteractionDetector>();
        assert_eq!(detector.keyword(), "wardrobe");
        let tracked: Vec<Entity> = detector.tracked().iter().map(|c| c.container).collect();
        assert_eq!(tracked, vec![wardrobe]);
    }

    #[test]
    fn unrelated_config_changes_keep_the_cache() {
        let mut app = make_interaction_test_app();
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(0, 0),
            UVec2::new(1, 1),
            Vec::new(),
        );
        enter_area(&mut app, "FarmHouse");
        let before = app.world().resource::<InteractionDetector>().clone();

        app.world_mut().resource_mut::<DresserUiConfig>().popup.title = String::from("Hats");
        app.update();

        assert_eq!(*app.world().resource::<InteractionDetector>(), before);
    }

    #[test]
    fn right_click_on_dresser_opens_popup_with_its_items() {
        let mut app = make_interaction_test_app();
        let shirt = spawn_item(&mut app, "Shirt");
        let hat = spawn_item(&mut app, "Hat");
        let dresser = spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(10, 5),
            UVec2::new(2, 1),
            vec![shirt, hat],
        );
        enter_area(&mut app, "FarmHouse");

        press(&mut app, MouseButton::Right, IVec2::new(11, 5));

        let popups = open_popups(&mut app);
        assert_eq!(popups.len(), 1);
        let (_, popup, source) = &popups[0];
        assert_eq!(popup.title(), "Outfits");
        assert_eq!(popup.items(), &[shirt, hat]);
        assert_eq!(*source, PopupSource(dresser));
        assert!(!app
            .world()
            .resource::<ButtonInput<MouseButton>>()
            .just_pressed(MouseButton::Right));
    }

    #[test]
    fn misses_and_other_buttons_do_not_open_popup() {
        let mut app = make_interaction_test_app();
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(10, 5),
            UVec2::new(2, 1),
            Vec::new(),
        );
        enter_area(&mut app, "FarmHouse");

        press(&mut app, MouseButton::Right, IVec2::new(12, 5));
        press(&mut app, MouseButton::Left, IVec2::new(10, 5));

        assert!(open_popups(&mut app).is_empty());
        assert!(app
            .world()
            .resource::<ButtonInput<MouseButton>>()
            .just_pressed(MouseButton::Right));
    }

    #[test]
    fn clicks_are_ignored_while_a_popup_is_open() {
        let mut app = make_interaction_test_app();
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(0, 0),
            UVec2::new(1, 1),
            Vec::new(),
        );
        spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(4, 0),
            UVec2::new(1, 1),
            Vec::new(),
        );
        enter_area(&mut app, "FarmHouse");

        press(&mut app, MouseButton::Right, IVec2::new(0, 0));
        press(&mut app, MouseButton::Right, IVec2::new(4, 0));

        assert_eq!(open_popups(&mut app).len(), 1);
    }

    #[test]
    fn popup_follows_container_contents() {
        let mut app = make_interaction_test_app();
        let shirt = spawn_item(&mut app, "Shirt");
        let dresser = spawn_furniture(
            &mut app,
            "dresser",
            "FarmHouse",
            IVec2::new(0, 0),
            UVec2::new(1, 1),
            vec![shirt],
        );
        enter_area(&mut app, "FarmHouse");
        press(&mut app, MouseButton::Right, IVec2::ZERO);

        let boots = spawn_item(&mut app, "Boots");
        app.world_mut()
            .get_mut::<HeldItems>(dresser)
            .expect("held items")
            .0
            .push(boots);
        app.update();

        let popups = open_popups(&mut app);
        assert_eq!(popups[0].1.items(), &[shirt, boots]);
    }
}
