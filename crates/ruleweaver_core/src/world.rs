use ruleweaver_data::WorldBounds;

/// Read-only view of the world handed to per-entity logic during a tick.
#[derive(Debug, Clone, Copy)]
pub struct WorldContext {
    pub bounds: WorldBounds,
    pub tick: u64,
}

impl WorldContext {
    #[must_use]
    pub fn new(bounds: WorldBounds, tick: u64) -> Self {
        Self { bounds, tick }
    }
}
