use bevy::{prelude::*, sprite::Anchor};

use crate::{
    data::{config::DresserUiConfig, world::ItemIcon},
    startup::textures::ChromeTextures,
};

use super::{
    geometry::clip_rect, ChromeTexture, DrawCommand, DrawList, GridPopup, PopupOverlay, POPUP_Z,
};

const LAYER_STEP: f32 = 0.01;
const FULL_TEXTURE: Rect = Rect {
    min: Vec2::ZERO,
    max: Vec2::ONE,
};
const ITEM_PLACEHOLDER_SCALE: f32 = 0.75;
const ITEM_PLACEHOLDER_COLOR: Color = Color::srgb(0.55, 0.55, 0.6);

/// Entity spawned from one popup draw command.
#[derive(Component, Debug, Clone, Copy)]
pub struct PopupDrawn;

fn fallback_color(texture: ChromeTexture) -> Color {
    match texture {
        ChromeTexture::DialogBox => Color::srgb(0.87, 0.65, 0.38),
        ChromeTexture::GridBackdrop => Color::BLACK,
        ChromeTexture::TitleBackground => Color::srgb(0.95, 0.78, 0.47),
        ChromeTexture::CloseButton => Color::srgb(0.75, 0.2, 0.15),
        ChromeTexture::SlotBackground => Color::srgb(0.8, 0.6, 0.36),
    }
}

/// Inset square drawn for items without an icon.
fn placeholder_rect(dest: IRect) -> IRect {
    let size = (dest.size().as_vec2() * ITEM_PLACEHOLDER_SCALE).as_ivec2();
    let min = dest.min + (dest.size() - size) / 2;
    IRect::from_corners(min, min + size)
}

/// Screen rect to its centre in the popup's local space (origin at the
/// viewport centre, y up).
fn rect_center(rect: IRect, viewport: Vec2) -> Vec2 {
    let center = rect.min.as_vec2() + rect.size().as_vec2() * 0.5;
    screen_to_local(center, viewport)
}

fn screen_to_local(point: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(point.x - viewport.x * 0.5, viewport.y * 0.5 - point.y)
}

/// Visible part of `dest` and the matching part of its texture, as fractions
/// from the texture's top-left corner.
fn crop(dest: IRect, clip: Option<IRect>) -> Option<(IRect, Rect)> {
    let Some(clip) = clip else {
        return Some((dest, FULL_TEXTURE));
    };
    let visible = clip_rect(dest, clip)?;
    let size = dest.size().as_vec2();
    let fraction = Rect::from_corners(
        (visible.min - dest.min).as_vec2() / size,
        (visible.max - dest.min).as_vec2() / size,
    );
    Some((visible, fraction))
}

/// Sprite showing `fraction` of `image` stretched over `size`.
fn cropped_sprite(
    image: Handle<Image>,
    images: Option<&Assets<Image>>,
    fraction: Rect,
    size: Vec2,
    color: Color,
) -> Sprite {
    let rect = if fraction == FULL_TEXTURE {
        None
    } else {
        images.and_then(|images| images.get(&image)).map(|loaded| {
            let texture_size = loaded.size_f32();
            Rect::from_corners(fraction.min * texture_size, fraction.max * texture_size)
        })
    };
    Sprite {
        image,
        color,
        custom_size: Some(size),
        rect,
        ..default()
    }
}

/// Where the screen sits in the world for one camera: the world point under
/// the viewport centre and the world size of one screen pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScreenFrame {
    center: Vec2,
    pixel: Vec2,
}

impl ScreenFrame {
    fn of(
        camera: &Camera,
        projection: &Projection,
        camera_transform: &GlobalTransform,
        viewport: Vec2,
    ) -> Self {
        let center = viewport * 0.5;
        let projected = camera
            .viewport_to_world_2d(camera_transform, center)
            .and_then(|origin| {
                camera
                    .viewport_to_world_2d(camera_transform, center + Vec2::ONE)
                    .map(|step| (origin, step))
            });
        if let Ok((origin, step)) = projected {
            return Self {
                center: origin,
                pixel: (step - origin).abs(),
            };
        }

        // Camera not laid out yet: derive the frame from its transform.
        let scale = match projection {
            Projection::Orthographic(orthographic) => orthographic.scale,
            _ => 1.0,
        };
        Self {
            center: camera_transform.translation().truncate(),
            pixel: Vec2::splat(scale),
        }
    }

    fn popup_transform(&self) -> Transform {
        Transform::from_translation(self.center.extend(POPUP_Z))
            .with_scale(self.pixel.extend(1.0))
    }
}

/// Pins every popup to the screen of the top-most active 2D camera, so that
/// its pixel-space children stay put however the camera moves or zooms.
pub(super) fn pin_popups_to_camera(
    cameras: Query<(&Camera, &Projection, &GlobalTransform), With<Camera2d>>,
    mut popups: Query<(&GridPopup, &mut Transform)>,
) {
    let Some((camera, projection, camera_transform)) = cameras
        .iter()
        .filter(|(camera, ..)| camera.is_active)
        .max_by_key(|(camera, ..)| camera.order)
    else {
        return;
    };

    for (popup, mut transform) in popups.iter_mut() {
        let target = ScreenFrame::of(
            camera,
            projection,
            camera_transform,
            popup.viewport().as_vec2(),
        )
        .popup_transform();
        if *transform != target {
            *transform = target;
        }
    }
}

/// Rebuilds the drawn children of every popup that changed since last frame.
pub(super) fn draw_grid_popups(
    mut commands: Commands,
    config: Res<DresserUiConfig>,
    textures: Res<ChromeTextures>,
    images: Option<Res<Assets<Image>>>,
    mut image_events: MessageReader<AssetEvent<Image>>,
    popups: Query<(Entity, Ref<GridPopup>, Option<&Children>)>,
    drawn: Query<(), With<PopupDrawn>>,
    icons: Query<&ItemIcon>,
) {
    // Cropping needs texture sizes, so redraw once late images arrive.
    let images_loaded = image_events
        .read()
        .any(|event| matches!(event, AssetEvent::LoadedWithDependencies { .. }));
    let images = images.as_deref();

    for (entity, popup, children) in popups.iter() {
        if !popup.is_changed() && !textures.is_changed() && !images_loaded {
            continue;
        }

        if let Some(children) = children {
            for child in children.iter() {
                if drawn.contains(child) {
                    commands.entity(child).despawn();
                }
            }
        }

        let mut list = DrawList::new(config.popup.title_font_size);
        popup.on_draw(&mut list);
        let viewport = popup.viewport().as_vec2();
        let font_size = list.font_size;

        commands.entity(entity).with_children(|parent| {
            for (layer, command) in list.commands.into_iter().enumerate() {
                let z = layer as f32 * LAYER_STEP;
                match command {
                    DrawCommand::TexturedRect {
                        texture,
                        dest,
                        clip,
                        tint,
                    } => {
                        let Some((visible, fraction)) = crop(dest, clip) else {
                            continue;
                        };
                        let size = visible.size().as_vec2();
                        let sprite = match textures.get(texture) {
                            Some(image) => cropped_sprite(image, images, fraction, size, tint),
                            None => Sprite::from_color(
                                fallback_color(texture).with_alpha(tint.alpha()),
                                size,
                            ),
                        };
                        parent.spawn((
                            PopupDrawn,
                            sprite,
                            Transform::from_translation(
                                rect_center(visible, viewport).extend(z),
                            ),
                        ));
                    }
                    DrawCommand::Text {
                        text,
                        position,
                        color,
                    } => {
                        parent.spawn((
                            PopupDrawn,
                            Text2d::new(text),
                            TextColor(color),
                            TextFont {
                                font_size,
                                ..default()
                            },
                            Anchor::TOP_LEFT,
                            Transform::from_translation(
                                screen_to_local(position.as_vec2(), viewport).extend(z),
                            ),
                        ));
                    }
                    DrawCommand::Item { item, dest, clip } => {
                        let (visible, sprite) = match icons.get(item) {
                            Ok(icon) => {
                                let Some((visible, fraction)) = crop(dest, clip) else {
                                    continue;
                                };
                                let size = visible.size().as_vec2();
                                let sprite = cropped_sprite(
                                    icon.0.clone(),
                                    images,
                                    fraction,
                                    size,
                                    Color::WHITE,
                                );
                                (visible, sprite)
                            }
                            Err(_) => {
                                let Some((visible, _)) = crop(placeholder_rect(dest), clip)
                                else {
                                    continue;
                                };
                                let sprite = Sprite::from_color(
                                    ITEM_PLACEHOLDER_COLOR,
                                    visible.size().as_vec2(),
                                );
                                (visible, sprite)
                            }
                        };
                        parent.spawn((
                            PopupDrawn,
                            sprite,
                            Transform::from_translation(
                                rect_center(visible, viewport).extend(z),
                            ),
                        ));
                    }
                }
            }
        });
    }
}
