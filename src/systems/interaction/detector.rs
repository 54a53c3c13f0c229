use bevy::prelude::*;

/// A furniture object as seen by [`InteractionDetector::refresh`].
#[derive(Debug, Clone, Copy)]
pub struct WorldObject<'a> {
    pub entity: Entity,
    pub identity: &'a str,
    pub tile: IVec2,
    pub footprint: UVec2,
}

/// Cached container in the home area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedContainer {
    pub container: Entity,
    pub origin: IVec2,
    pub footprint: UVec2,
}

impl TrackedContainer {
    /// Occupied tiles are `[x, x + width) × [y, y + height)`.
    pub fn occupies(&self, tile: IVec2) -> bool {
        let end = self.origin + self.footprint.as_ivec2();
        tile.x >= self.origin.x && tile.x < end.x && tile.y >= self.origin.y && tile.y < end.y
    }

    pub fn occupied_tiles(&self) -> impl Iterator<Item = IVec2> + '_ {
        let width = self.footprint.x as i32;
        let height = self.footprint.y as i32;
        (0..width).flat_map(move |dx| (0..height).map(move |dy| self.origin + IVec2::new(dx, dy)))
    }

    fn overlaps(&self, other: &TrackedContainer) -> bool {
        let self_end = self.origin + self.footprint.as_ivec2();
        let other_end = other.origin + other.footprint.as_ivec2();
        self.origin.x < other_end.x
            && other.origin.x < self_end.x
            && self.origin.y < other_end.y
            && other.origin.y < self_end.y
    }
}

/// Tile hit-testing against the containers of the home area.
///
/// The cache is rebuilt wholesale on every accepted refresh and is never
/// edited in place. Refreshes for any other area leave it untouched.
#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct InteractionDetector {
    home_area: String,
    keyword: String,
    tracked: Vec<TrackedContainer>,
}

impl InteractionDetector {
    pub fn new(home_area: impl Into<String>, keyword: &str) -> Self {
        Self {
            home_area: home_area.into(),
            keyword: keyword.to_lowercase(),
            tracked: Vec::new(),
        }
    }

    pub fn home_area(&self) -> &str {
        &self.home_area
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Whether this detector was built for `home_area` and `keyword`.
    pub fn is_configured_for(&self, home_area: &str, keyword: &str) -> bool {
        self.home_area == home_area && self.keyword == keyword.to_lowercase()
    }

    pub fn tracked(&self) -> &[TrackedContainer] {
        &self.tracked
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn matches(&self, identity: &str) -> bool {
        identity.to_lowercase().contains(&self.keyword)
    }

    /// Replaces the cache with the matching objects of `area`.
    ///
    /// Returns `false` without touching the cache when `area` is not the home area.
    pub fn refresh<'a>(
        &mut self,
        area: &str,
        objects: impl IntoIterator<Item = WorldObject<'a>>,
    ) -> bool {
        if area != self.home_area {
            return false;
        }

        let tracked: Vec<TrackedContainer> = objects
            .into_iter()
            .filter(|object| self.matches(object.identity))
            .map(|object| TrackedContainer {
                container: object.entity,
                origin: object.tile,
                footprint: object.footprint,
            })
            .collect();

        for (index, container) in tracked.iter().enumerate() {
            if let Some(other) = tracked[index + 1..]
                .iter()
                .find(|other| container.overlaps(other))
            {
                warn!(
                    "containers {:?} and {:?} overlap; hit-tests resolve to {:?}",
                    container.container, other.container, container.container
                );
            }
        }

        self.tracked = tracked;
        debug!(
            "tracking {} container(s) in {}",
            self.tracked.len(),
            self.home_area
        );
        true
    }

    /// First cached container, in refresh order, whose footprint holds `tile`.
    pub fn hit_test(&self, tile: IVec2) -> Option<TrackedContainer> {
        self.tracked
            .iter()
            .find(|container| container.occupies(tile))
            .copied()
    }
}
