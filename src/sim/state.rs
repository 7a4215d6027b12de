//! World state owned by the frame loop
//!
//! Targets live in a flat arena addressed by stable ids. Nothing is removed
//! while the arena is being iterated: steps report outcomes, and `compact`
//! drops dead entries afterwards.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::hit::Hit;
use super::pointer::PointerSmoother;
use super::target::{self, Target};

/// Something the surrounding application should react to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    /// A shoot edge was processed (hit or miss)
    ShotFired { pos: Vec2 },
    /// A flying target was hit
    TargetHit(Hit),
    /// A flying target left the bottom of the screen
    TargetEscaped { id: u32, pos: Vec2 },
    /// A replacement target entered
    TargetSpawned { id: u32 },
}

/// A short-lived burst drawn where a target was hit
#[derive(Debug, Clone, Copy)]
pub struct Burst {
    pub pos: Vec2,
    /// 1.0 when spawned, removed at 0
    pub life: f32,
}

/// Frames a hit burst stays on screen
pub const BURST_FRAMES: f32 = 30.0;
/// Muzzle flash decay per frame
pub const FLASH_DECAY: f32 = 0.8;

/// Everything the simulation mutates
#[derive(Debug, Clone)]
pub struct World {
    /// Seed the spawn RNG was created from
    pub seed: u64,
    rng: Pcg32,
    /// Frames simulated so far
    pub frame: u64,
    /// Smoothed cursor
    pub cursor: PointerSmoother,
    /// Live targets, sorted by id
    pub targets: Vec<Target>,
    /// Number of targets kept in the air at once
    pub slots: usize,
    /// Hit bursts (cosmetic)
    pub bursts: Vec<Burst>,
    /// Muzzle flash intensity (0-1, cosmetic)
    pub flash: f32,
    next_id: u32,
}

impl World {
    /// Create a world with one target already in the air
    pub fn new(seed: u64, round: u32, speed_multiplier: f32) -> Self {
        let mut world = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            frame: 0,
            cursor: PointerSmoother::default(),
            targets: Vec::new(),
            slots: 1,
            bursts: Vec::new(),
            flash: 0.0,
            next_id: 1,
        };
        world.refill(round, speed_multiplier, &mut Vec::new());
        world
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one target and return its id
    pub fn spawn_target(&mut self, round: u32, speed_multiplier: f32) -> u32 {
        let id = self.next_entity_id();
        let target = target::spawn(&mut self.rng, id, round, speed_multiplier);
        self.targets.push(target);
        id
    }

    /// Top the arena back up to `slots` targets
    pub fn refill(&mut self, round: u32, speed_multiplier: f32, events: &mut Vec<GameEvent>) {
        while self.targets.len() < self.slots {
            let id = self.spawn_target(round, speed_multiplier);
            events.push(GameEvent::TargetSpawned { id });
        }
    }

    /// Drop targets whose ids are in `dead`
    pub fn compact(&mut self, dead: &[u32]) {
        if !dead.is_empty() {
            self.targets.retain(|t| !dead.contains(&t.id));
        }
    }

    /// Look up a live target by id
    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Count of targets that can still be hit
    pub fn flying_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_flying()).count()
    }

    /// Ensure targets are sorted by ID for stable hit-test order
    pub fn normalize_order(&mut self) {
        self.targets.sort_by_key(|t| t.id);
    }
}
