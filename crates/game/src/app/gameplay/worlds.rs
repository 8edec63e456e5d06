use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct WorldDescriptor {
    pub id: &'static str,
    pub name: &'static str,
}

pub(crate) const DEFAULT_WORLD: WorldDescriptor = WorldDescriptor {
    id: "castle",
    name: "Castle",
};

pub(crate) const WORLDS: [WorldDescriptor; 6] = [
    DEFAULT_WORLD,
    WorldDescriptor {
        id: "pyramids",
        name: "Pyramids",
    },
    WorldDescriptor {
        id: "roman",
        name: "Roman Ruins",
    },
    WorldDescriptor {
        id: "city",
        name: "Cityscape",
    },
    WorldDescriptor {
        id: "jungle",
        name: "Jungle",
    },
    WorldDescriptor {
        id: "space",
        name: "Outer Space",
    },
];

pub(crate) fn find_world(id: &str) -> Option<&'static WorldDescriptor> {
    WORLDS.iter().find(|world| world.id == id)
}

pub(crate) fn resolve_world(requested: Option<&str>) -> &'static WorldDescriptor {
    if let Some(world) = requested.and_then(find_world) {
        return world;
    }
    debug!(
        requested = requested.unwrap_or("-"),
        fallback = DEFAULT_WORLD.id,
        "world_id_fallback"
    );
    &DEFAULT_WORLD
}
