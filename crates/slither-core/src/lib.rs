//! Core types and simulation pipeline shared across the Slither workspace.

use ordered_float::OrderedFloat;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use slotmap::{SecondaryMap, SlotMap, new_key_type};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

new_key_type! {
    /// Stable handle for snakes backed by a generational slot map.
    pub struct AgentId;
}

new_key_type! {
    /// Stable handle for food items.
    pub struct FoodId;
}

/// Convenience alias for associating side data with agents.
pub type AgentMap<T> = SecondaryMap<AgentId, T>;

/// RGB triple in the 0-255 range used for snakes and food.
pub type Rgb = [u8; 3];

/// Tint applied to world-spawned food.
pub const FOOD_TINT: Rgb = [255, 180, 180];

/// Body color of the player snake.
pub const PLAYER_COLOR: Rgb = [0, 100, 255];

/// Palette handed to bots by creation order; later bots get random colors.
pub const BOT_PALETTE: [Rgb; 18] = [
    [0, 255, 0],
    [255, 0, 0],
    [0, 192, 255],
    [255, 128, 0],
    [255, 0, 255],
    [255, 255, 0],
    [128, 0, 255],
    [0, 255, 255],
    [255, 80, 80],
    [130, 255, 67],
    [240, 164, 96],
    [200, 120, 40],
    [255, 0, 120],
    [80, 189, 255],
    [0, 176, 96],
    [220, 200, 0],
    [0, 100, 255],
    [0, 225, 205],
];

/// Cosmetic face tags assigned to snakes at creation; never drawn by the core.
pub const SNAKE_FACES: [&str; 14] = [
    "😀", "😈", "😁", "😎", "🤪", "🥶", "🥳", "😏", "😭", "😬", "🐍", "👽", "🥸", "😅",
];

/// High level simulation clock (ticks processed since boot).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Resets the tick counter back to zero.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

/// Axis-aligned 2D point in world space.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Construct a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Heading vector; unit length once a snake has turned at least once.
///
/// Freshly spawned snakes carry the diagonal `(±1, ±1)` heading, so they
/// move slightly faster than their nominal speed until the first steering
/// input collapses the vector onto the unit circle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Heading {
    pub x: f32,
    pub y: f32,
}

impl Heading {
    /// Construct a heading from raw components.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit heading pointing at `angle` radians.
    #[must_use]
    pub fn from_angle(angle: f32) -> Self {
        Self {
            x: angle.cos(),
            y: angle.sin(),
        }
    }

    /// Angle of this heading in radians.
    #[must_use]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }
}

impl Default for Heading {
    fn default() -> Self {
        Self { x: 1.0, y: 0.0 }
    }
}

/// Wraps a scalar coordinate into `[0, extent)`.
#[must_use]
pub fn wrap_position(value: f32, extent: f32) -> f32 {
    if extent <= 0.0 {
        return 0.0;
    }
    let mut v = value % extent;
    if v < 0.0 {
        v += extent;
    }
    v
}

/// Wraps a point into the world extent componentwise.
#[must_use]
pub fn wrap_point(point: Point, width: f32, height: f32) -> Point {
    Point::new(wrap_position(point.x, width), wrap_position(point.y, height))
}

/// Plain Euclidean distance between two points in unwrapped coordinates.
#[must_use]
pub fn distance(a: Point, b: Point) -> f32 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Shortest distance between two points on the torus.
#[must_use]
pub fn torus_distance(a: Point, b: Point, width: f32, height: f32) -> f32 {
    let mut dx = (a.x - b.x).abs();
    let mut dy = (a.y - b.y).abs();
    if width > 0.0 {
        dx = dx.min(width - dx);
    }
    if height > 0.0 {
        dy = dy.min(height - dy);
    }
    dx.hypot(dy)
}

/// Distance from `point` to the closest point of segment `a..b`.
///
/// A degenerate segment falls back to the point distance.
#[must_use]
pub fn point_segment_distance(point: Point, a: Point, b: Point) -> f32 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx == 0.0 && dy == 0.0 {
        return distance(point, a);
    }
    let t = ((point.x - a.x) * dx + (point.y - a.y) * dy) / (dx * dx + dy * dy);
    let t = t.clamp(0.0, 1.0);
    distance(point, Point::new(a.x + t * dx, a.y + t * dy))
}

/// Distinguishes the externally controlled snake from autonomous ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AgentKind {
    Player,
    Bot,
}

impl AgentKind {
    /// Whether this agent steers itself.
    #[must_use]
    pub const fn is_bot(self) -> bool {
        matches!(self, AgentKind::Bot)
    }
}

/// A single snake: identity, body, heading, and lifecycle state.
///
/// The body is ordered head first; it holds `max(1, floor(length))`
/// whole segments while `length` itself erodes fractionally under boost.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snake {
    pub kind: AgentKind,
    pub name: String,
    pub face: String,
    pub color: Rgb,
    pub body: VecDeque<Point>,
    pub direction: Heading,
    pub length: f32,
    pub alive: bool,
    /// World-clock timestamp of the last death; 0.0 while alive.
    pub died_at: f64,
}

impl Snake {
    /// Creates a snake with a single-point body at `spawn`.
    #[must_use]
    pub fn new(
        kind: AgentKind,
        name: String,
        face: String,
        color: Rgb,
        spawn: Point,
        direction: Heading,
        length: f32,
    ) -> Self {
        Self {
            kind,
            name,
            face,
            color,
            body: VecDeque::from([spawn]),
            direction,
            length,
            alive: true,
            died_at: 0.0,
        }
    }

    /// Current head position.
    #[must_use]
    pub fn head(&self) -> Point {
        self.body.front().copied().unwrap_or_default()
    }

    /// Whole segments gained over the spawn baseline.
    #[must_use]
    pub fn score(&self, baseline: f32) -> u32 {
        (self.length - baseline).max(0.0) as u32
    }
}

/// Steering memory attached to each bot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BotMind {
    /// Target point the bot keeps steering at while the cooldown runs.
    pub sticky_target: Option<Point>,
    /// Remaining ticks before the sticky target is re-evaluated.
    pub sticky_ticks: u32,
    /// Most recently applied steering delta in radians; jitter is gated on
    /// this being nonzero, and it is left untouched on no-steer ticks so
    /// wander persists after targets disappear.
    pub last_turn: f32,
}

/// Per-tick control input for the player snake.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// World-space point to steer toward; `None` keeps the current heading.
    pub target: Option<Point>,
    /// Whether the boost button is held.
    pub boost: bool,
}

/// A collectible item dropped somewhere in the world.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FoodItem {
    pub position: Point,
    pub color: Rgb,
}

/// Errors surfaced while constructing a world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Static configuration for a slither world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlitherConfig {
    /// Width of the map in world units.
    pub world_width: f32,
    /// Height of the map in world units.
    pub world_height: f32,
    /// Collision radius of a snake segment.
    pub snake_radius: f32,
    /// Collision radius of a food item.
    pub food_radius: f32,
    /// Base movement speed in world units per tick.
    pub base_speed: f32,
    /// Speed multiplier applied while boosting.
    pub boost_multiplier: f32,
    /// Length shed per tick of boosting.
    pub boost_cost: f32,
    /// Baseline and minimum snake length.
    pub min_length: f32,
    /// Length gained per food item eaten.
    pub growth_per_food: f32,
    /// Live bot population the world maintains.
    pub bot_count: usize,
    /// Food population the world replenishes toward.
    pub food_count: usize,
    /// Seconds a dead bot waits before it may respawn.
    pub respawn_delay: f64,
    /// Seconds a dead bot lingers in the registry before being pruned.
    pub dead_retention: f64,
    /// Margin kept from the map rim when placing spawns.
    pub spawn_margin: f32,
    /// Half-extent of the central square excluded from spawn placement.
    pub safe_zone_half: f32,
    /// How much longer another snake must be to count as a threat.
    pub threat_margin: f32,
    /// Base threat detection radius; the bot's own length is added on top.
    pub threat_radius_base: f32,
    /// Length margin within which another snake still counts as prey.
    pub prey_margin: f32,
    /// Detection radius for prey.
    pub prey_radius: f32,
    /// Minimum length before a bot starts hunting.
    pub hunt_min_length: f32,
    /// Minimum length before a bot will boost toward food.
    pub forage_boost_min_length: f32,
    /// Per-tick chance of boosting while foraging.
    pub forage_boost_chance: f64,
    /// Per-tick chance of heading jitter for bots with turning history.
    pub jitter_chance: f64,
    /// Maximum jitter magnitude in radians.
    pub jitter_max: f32,
    /// Heading weight kept when a bot blends toward a target.
    pub turn_inertia: f32,
    /// Heading weight kept when blending away from a threat.
    pub avoid_inertia: f32,
    /// Minimum ticks a freshly chosen target stays sticky.
    pub sticky_ticks_min: u32,
    /// Maximum ticks a freshly chosen target stays sticky.
    pub sticky_ticks_max: u32,
    /// Simulated seconds per tick.
    pub tick_dt: f64,
    /// Optional RNG seed for reproducible worlds.
    pub rng_seed: Option<u64>,
    /// Maximum number of recent tick summaries retained in-memory;
    /// 0 disables the history ring.
    pub history_capacity: usize,
    /// Measure agent proximity across the map seam. Off by default: the
    /// stock balance assumes unwrapped distances, which leaves snakes
    /// blind to neighbors just across the seam.
    pub wrap_aware_proximity: bool,
}

impl Default for SlitherConfig {
    fn default() -> Self {
        Self {
            world_width: 3_200.0,
            world_height: 2_400.0,
            snake_radius: 8.0,
            food_radius: 4.0,
            base_speed: 2.0,
            boost_multiplier: 2.0,
            boost_cost: 0.2,
            min_length: 10.0,
            growth_per_food: 5.0,
            bot_count: 18,
            food_count: 200,
            respawn_delay: 5.0,
            dead_retention: 15.0,
            spawn_margin: 100.0,
            safe_zone_half: 250.0,
            threat_margin: 4.0,
            threat_radius_base: 70.0,
            prey_margin: 8.0,
            prey_radius: 180.0,
            hunt_min_length: 15.0,
            forage_boost_min_length: 20.0,
            forage_boost_chance: 0.10,
            jitter_chance: 0.10,
            jitter_max: 0.15,
            turn_inertia: 0.8,
            avoid_inertia: 0.85,
            sticky_ticks_min: 8,
            sticky_ticks_max: 20,
            tick_dt: 1.0 / 60.0,
            rng_seed: None,
            history_capacity: 256,
            wrap_aware_proximity: false,
        }
    }
}

impl SlitherConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), WorldError> {
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(WorldError::InvalidConfig(
                "world dimensions must be positive",
            ));
        }
        if self.snake_radius <= 0.0 || self.food_radius <= 0.0 {
            return Err(WorldError::InvalidConfig(
                "collision radii must be positive",
            ));
        }
        if self.base_speed <= 0.0 || self.boost_multiplier < 1.0 {
            return Err(WorldError::InvalidConfig(
                "base_speed must be positive and boost_multiplier at least 1",
            ));
        }
        if self.boost_cost < 0.0 || self.growth_per_food < 0.0 {
            return Err(WorldError::InvalidConfig(
                "boost_cost and growth_per_food must be non-negative",
            ));
        }
        if self.min_length < 1.0 {
            return Err(WorldError::InvalidConfig("min_length must be at least 1"));
        }
        if self.respawn_delay < 0.0 || self.dead_retention < self.respawn_delay {
            return Err(WorldError::InvalidConfig(
                "dead_retention must be at least respawn_delay",
            ));
        }
        if self.spawn_margin < 0.0
            || self.spawn_margin * 2.0 >= self.world_width.min(self.world_height)
        {
            return Err(WorldError::InvalidConfig(
                "spawn_margin must leave room inside the map",
            ));
        }
        if self.safe_zone_half < 0.0
            || (self.world_width * 0.5 - self.safe_zone_half <= self.spawn_margin
                && self.world_height * 0.5 - self.safe_zone_half <= self.spawn_margin)
        {
            return Err(WorldError::InvalidConfig(
                "safe zone must not cover the entire spawn area",
            ));
        }
        if self.threat_radius_base <= 0.0 || self.prey_radius <= 0.0 {
            return Err(WorldError::InvalidConfig(
                "detection radii must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.turn_inertia)
            || !(0.0..=1.0).contains(&self.avoid_inertia)
        {
            return Err(WorldError::InvalidConfig(
                "steering inertia weights must lie in [0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter_chance)
            || !(0.0..=1.0).contains(&self.forage_boost_chance)
        {
            return Err(WorldError::InvalidConfig(
                "per-tick chances must lie in [0, 1]",
            ));
        }
        if self.jitter_max < 0.0 {
            return Err(WorldError::InvalidConfig("jitter_max must be non-negative"));
        }
        if self.sticky_ticks_min > self.sticky_ticks_max {
            return Err(WorldError::InvalidConfig(
                "sticky tick range must be ordered",
            ));
        }
        if self.tick_dt <= 0.0 {
            return Err(WorldError::InvalidConfig("tick_dt must be positive"));
        }
        Ok(())
    }

    /// Returns the configured RNG, seeding from entropy if no seed is set.
    fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }
}

/// Events emitted after processing a world tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TickEvents {
    pub tick: Tick,
    /// Snakes that died this tick.
    pub deaths: usize,
    /// Whether the player was among them.
    pub player_died: bool,
    /// Whether a dead bot was revived this tick.
    pub bot_respawned: bool,
    /// Brand-new bots created to top up the population.
    pub bots_spawned: usize,
    /// Food items added to restore the target population.
    pub food_spawned: usize,
    /// Newly recorded best score, if the player beat the stored one.
    pub new_high_score: Option<u32>,
}

/// Per-tick population summary retained in the in-memory history ring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TickSummary {
    pub tick: Tick,
    pub alive_bots: usize,
    pub food_count: usize,
    pub deaths: usize,
    pub player_score: u32,
    pub player_alive: bool,
}

/// Persistence hook for the single-integer high score.
pub trait HighScoreStore: Send {
    /// Returns the previously persisted best score, or 0 when absent.
    fn load(&mut self) -> u32;

    /// Records a new best score.
    fn record(&mut self, score: u32);
}

/// No-op store used when persistence is not wired up.
#[derive(Debug, Default)]
pub struct NullHighScoreStore;

impl HighScoreStore for NullHighScoreStore {
    fn load(&mut self) -> u32 {
        0
    }

    fn record(&mut self, _score: u32) {}
}

/// Read-only view of one snake handed to rendering collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub face: String,
    pub color: Rgb,
    pub body: Vec<Point>,
    pub alive: bool,
    pub is_player: bool,
}

/// Read-only view of one food item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FoodSnapshot {
    pub position: Point,
    pub color: Rgb,
}

/// Outcome of one bot's per-tick steering evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct BotDecision {
    target: Option<Point>,
    avoid: Option<Point>,
    boost: bool,
}

/// Aggregate world state owning every registry in the simulation.
pub struct World {
    config: SlitherConfig,
    tick: Tick,
    time: f64,
    rng: SmallRng,
    agents: SlotMap<AgentId, Snake>,
    /// Fixed iteration order: player first, then bots in spawn order.
    roster: Vec<AgentId>,
    player: AgentId,
    minds: AgentMap<BotMind>,
    food: SlotMap<FoodId, FoodItem>,
    bots_created: usize,
    last_bot_spawn: f64,
    high_score: u32,
    store: Box<dyn HighScoreStore>,
    history: VecDeque<TickSummary>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("config", &self.config)
            .field("tick", &self.tick)
            .field("time", &self.time)
            .field("agent_count", &self.agents.len())
            .field("food_count", &self.food.len())
            .finish()
    }
}

impl World {
    /// Instantiate a new world using the supplied configuration.
    pub fn new(config: SlitherConfig) -> Result<Self, WorldError> {
        Self::with_store(config, Box::new(NullHighScoreStore))
    }

    /// Instantiate a new world with a high-score persistence sink.
    pub fn with_store(
        config: SlitherConfig,
        mut store: Box<dyn HighScoreStore>,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let rng = config.seeded_rng();
        let high_score = store.load();
        let history_capacity = config.history_capacity;
        let mut world = Self {
            config,
            tick: Tick::zero(),
            time: 0.0,
            rng,
            agents: SlotMap::with_key(),
            roster: Vec::new(),
            player: AgentId::default(),
            minds: AgentMap::new(),
            food: SlotMap::with_key(),
            bots_created: 0,
            last_bot_spawn: 0.0,
            high_score,
            store,
            history: VecDeque::with_capacity(history_capacity),
        };
        world.populate();
        Ok(world)
    }

    /// Rebuilds the starting population, keeping clock, store, and best score.
    pub fn reset(&mut self) {
        self.agents.clear();
        self.roster.clear();
        self.minds.clear();
        self.food.clear();
        self.bots_created = 0;
        self.populate();
    }

    fn populate(&mut self) {
        let center = Point::new(self.config.world_width * 0.5, self.config.world_height * 0.5);
        let face = self.random_face();
        let direction = self.random_direction();
        let min_length = self.config.min_length;
        let player = Snake::new(
            AgentKind::Player,
            "You".to_owned(),
            face,
            PLAYER_COLOR,
            center,
            direction,
            min_length,
        );
        let id = self.agents.insert(player);
        self.roster.push(id);
        self.player = id;

        for _ in 0..self.config.bot_count {
            self.spawn_bot();
        }
        while self.food.len() < self.config.food_count {
            let position = self.random_food_point();
            self.food.insert(FoodItem {
                position,
                color: FOOD_TINT,
            });
        }
        self.last_bot_spawn = self.time;
    }

    /// Execute one fixed-timestep tick of the simulation pipeline.
    pub fn step(&mut self, input: PlayerInput) -> TickEvents {
        self.tick = self.tick.next();
        self.time += self.config.tick_dt;

        let mut events = TickEvents {
            tick: self.tick,
            ..TickEvents::default()
        };
        self.stage_player(input);
        self.stage_population(&mut events);
        self.stage_bots();
        self.stage_collisions(&mut events);
        self.stage_food_replenish(&mut events);
        self.push_summary(events.deaths);
        events
    }

    fn stage_player(&mut self, input: PlayerInput) {
        self.advance_snake(self.player, input.target, None, input.boost);
    }

    fn stage_population(&mut self, events: &mut TickEvents) {
        let now = self.time;
        let delay = self.config.respawn_delay;

        // At most one dead bot comes back per tick.
        let due = self.roster.iter().copied().find(|&id| {
            self.agents.get(id).is_some_and(|snake| {
                snake.kind.is_bot()
                    && !snake.alive
                    && snake.died_at > 0.0
                    && now - snake.died_at >= delay
            })
        });
        if let Some(id) = due {
            self.respawn_bot(id);
            events.bot_respawned = true;
        }

        let retention = self.config.dead_retention;
        let stale: Vec<AgentId> = self
            .roster
            .iter()
            .copied()
            .filter(|&id| {
                self.agents.get(id).is_some_and(|snake| {
                    snake.kind.is_bot() && !snake.alive && now - snake.died_at >= retention
                })
            })
            .collect();
        for id in stale {
            self.agents.remove(id);
            self.minds.remove(id);
        }
        self.roster.retain(|&id| self.agents.contains_key(id));

        // Top up the population, throttled so it never spikes past target.
        if self.alive_bot_count() < self.config.bot_count && now - self.last_bot_spawn >= delay {
            self.spawn_bot();
            self.last_bot_spawn = now;
            events.bots_spawned = 1;
        }
    }

    fn stage_bots(&mut self) {
        let bots: Vec<AgentId> = self
            .roster
            .iter()
            .copied()
            .filter(|&id| {
                self.agents
                    .get(id)
                    .is_some_and(|snake| snake.kind.is_bot() && snake.alive)
            })
            .collect();
        for id in bots {
            let decision = self.decide(id);
            self.advance_snake(id, decision.target, decision.avoid, decision.boost);
        }
    }

    /// Kill pass, sequential in roster order: a snake that dies here stops
    /// counting as a collision source for the snakes checked after it.
    fn stage_collisions(&mut self, events: &mut TickEvents) {
        let kill_range = self.config.snake_radius * 2.0;
        let order = self.roster.clone();
        for id in order {
            let head = match self.agents.get(id) {
                Some(snake) if snake.alive => snake.head(),
                _ => continue,
            };
            let hit = self
                .roster
                .iter()
                .copied()
                .filter(|&other| other != id)
                .filter_map(|other| self.agents.get(other))
                .filter(|other| other.alive)
                .any(|other| {
                    other
                        .body
                        .iter()
                        .skip(1)
                        .any(|&segment| self.proximity(head, segment) < kill_range)
                });
            if hit {
                self.kill_snake(id, events);
            }
        }
    }

    fn stage_food_replenish(&mut self, events: &mut TickEvents) {
        while self.food.len() < self.config.food_count {
            let position = self.random_food_point();
            self.food.insert(FoodItem {
                position,
                color: FOOD_TINT,
            });
            events.food_spawned += 1;
        }
    }

    /// Advances one snake: steering, motion, swept food pickup, growth,
    /// truncation, and boost erosion.
    fn advance_snake(
        &mut self,
        id: AgentId,
        target: Option<Point>,
        avoid: Option<Point>,
        boosting: bool,
    ) {
        let (is_bot, head, mut direction, alive) = match self.agents.get(id) {
            Some(snake) => (snake.kind.is_bot(), snake.head(), snake.direction, snake.alive),
            None => return,
        };
        if !alive {
            return;
        }

        if is_bot
            && self.config.jitter_max > 0.0
            && self.minds.get(id).is_some_and(|mind| mind.last_turn != 0.0)
            && self.rng.random_bool(self.config.jitter_chance)
        {
            let jitter = self
                .rng
                .random_range(-self.config.jitter_max..self.config.jitter_max);
            direction = Heading::from_angle(direction.angle() + jitter);
        }

        // Raw angle arithmetic on purpose: the blends do not renormalize
        // across the ±π seam, and gameplay balance depends on that.
        let steer_origin = direction.angle();
        if let Some(threat) = avoid {
            let away = (head.y - threat.y).atan2(head.x - threat.x);
            let current = direction.angle();
            let inertia = self.config.avoid_inertia;
            direction = Heading::from_angle(current * inertia + away * (1.0 - inertia));
        }
        if let Some(target) = target {
            let toward = (target.y - head.y).atan2(target.x - head.x);
            let angle = if is_bot {
                let inertia = self.config.turn_inertia;
                direction.angle() * inertia + toward * (1.0 - inertia)
            } else {
                toward
            };
            direction = Heading::from_angle(angle);
        }
        if is_bot && (avoid.is_some() || target.is_some()) {
            if let Some(mind) = self.minds.get_mut(id) {
                mind.last_turn = direction.angle() - steer_origin;
            }
        }

        let speed = if boosting {
            self.config.base_speed * self.config.boost_multiplier
        } else {
            self.config.base_speed
        };
        let new_head = wrap_point(
            Point::new(head.x + direction.x * speed, head.y + direction.y * speed),
            self.config.world_width,
            self.config.world_height,
        );

        // Pickup runs over the travel segment before the head lands, so
        // boosted snakes cannot tunnel past food between ticks.
        let eaten = self.collect_food_along_path(head, new_head);

        let growth = eaten as f32 * self.config.growth_per_food;
        let min_length = self.config.min_length;
        let boost_cost = self.config.boost_cost;
        let Some(snake) = self.agents.get_mut(id) else {
            return;
        };
        snake.direction = direction;
        snake.length += growth;
        snake.body.push_front(new_head);
        let keep = snake.length.floor().max(1.0) as usize;
        while snake.body.len() > keep {
            snake.body.pop_back();
        }
        if boosting && snake.length > min_length {
            snake.length = (snake.length - boost_cost).max(min_length);
        }
    }

    /// Swept pickup over the head's travel segment; returns items consumed.
    fn collect_food_along_path(&mut self, from: Point, to: Point) -> usize {
        let reach = self.config.snake_radius + self.config.food_radius;
        let before = self.food.len();
        self.food
            .retain(|_, item| point_segment_distance(item.position, from, to) >= reach);
        before - self.food.len()
    }

    /// Per-tick steering decision for one bot: avoid the nearest larger
    /// snake, hunt the nearest comparable one, otherwise forage.
    fn decide(&mut self, id: AgentId) -> BotDecision {
        let (head, own_length) = match self.agents.get(id) {
            Some(bot) => (bot.head(), bot.length),
            None => return BotDecision::default(),
        };

        let avoid = self.nearest_threat(id, head, own_length);

        let prey = self.nearest_prey(id, head, own_length);
        let mut target;
        let boost;
        if let Some(prey_head) = prey.filter(|_| own_length > self.config.hunt_min_length) {
            target = Some(prey_head);
            boost = true;
        } else if let Some(food) = self.nearest_food(head) {
            target = Some(food);
            boost = own_length > self.config.forage_boost_min_length
                && self.rng.random_bool(self.config.forage_boost_chance);
        } else {
            target = None;
            boost = false;
        }

        // A held target wins until its countdown lapses; boost and avoid
        // always come from the fresh evaluation.
        if let Some(mind) = self.minds.get_mut(id) {
            if mind.sticky_target.is_some() && mind.sticky_ticks > 0 {
                target = mind.sticky_target;
                mind.sticky_ticks -= 1;
            } else {
                mind.sticky_target = target;
                mind.sticky_ticks = self
                    .rng
                    .random_range(self.config.sticky_ticks_min..=self.config.sticky_ticks_max);
            }
        }

        BotDecision {
            target,
            avoid,
            boost,
        }
    }

    /// Head of the nearest living snake large enough to count as a threat.
    fn nearest_threat(&self, id: AgentId, head: Point, own_length: f32) -> Option<Point> {
        let reach = self.config.threat_radius_base + own_length;
        self.roster
            .iter()
            .copied()
            .filter(|&other| other != id)
            .filter_map(|other| self.agents.get(other))
            .filter(|other| other.alive && other.length > own_length + self.config.threat_margin)
            .map(|other| (other.head(), self.proximity(head, other.head())))
            .filter(|&(_, dist)| dist < reach)
            .min_by_key(|&(_, dist)| OrderedFloat(dist))
            .map(|(point, _)| point)
    }

    /// Head of the nearest living snake small enough to hunt.
    fn nearest_prey(&self, id: AgentId, head: Point, own_length: f32) -> Option<Point> {
        self.roster
            .iter()
            .copied()
            .filter(|&other| other != id)
            .filter_map(|other| self.agents.get(other))
            .filter(|other| other.alive && other.length <= own_length + self.config.prey_margin)
            .map(|other| (other.head(), self.proximity(head, other.head())))
            .filter(|&(_, dist)| dist < self.config.prey_radius)
            .min_by_key(|&(_, dist)| OrderedFloat(dist))
            .map(|(point, _)| point)
    }

    fn nearest_food(&self, head: Point) -> Option<Point> {
        self.food
            .values()
            .min_by_key(|item| OrderedFloat(distance(item.position, head)))
            .map(|item| item.position)
    }

    /// Agent-to-agent distance; unwrapped by default, torus-aware when the
    /// `wrap_aware_proximity` switch is set.
    fn proximity(&self, a: Point, b: Point) -> f32 {
        if self.config.wrap_aware_proximity {
            torus_distance(a, b, self.config.world_width, self.config.world_height)
        } else {
            distance(a, b)
        }
    }

    /// Converts the snake's entire body into tinted food and marks it dead.
    fn kill_snake(&mut self, id: AgentId, events: &mut TickEvents) {
        let now = self.time;
        let (color, body, is_player) = match self.agents.get_mut(id) {
            Some(snake) => {
                snake.alive = false;
                snake.died_at = now;
                (
                    snake.color,
                    snake.body.iter().copied().collect::<Vec<Point>>(),
                    !snake.kind.is_bot(),
                )
            }
            None => return,
        };
        for position in body {
            self.food.insert(FoodItem { position, color });
        }
        events.deaths += 1;
        if is_player {
            events.player_died = true;
            let score = self.player_score();
            if score > self.high_score {
                self.high_score = score;
                self.store.record(score);
                events.new_high_score = Some(score);
            }
        }
    }

    fn respawn_bot(&mut self, id: AgentId) {
        let spawn = self.safe_spawn_point();
        let direction = self.random_direction();
        let min_length = self.config.min_length;
        if let Some(snake) = self.agents.get_mut(id) {
            snake.body.clear();
            snake.body.push_back(spawn);
            snake.length = min_length;
            snake.direction = direction;
            snake.alive = true;
            snake.died_at = 0.0;
        }
        if let Some(mind) = self.minds.get_mut(id) {
            *mind = BotMind::default();
        }
    }

    fn spawn_bot(&mut self) -> AgentId {
        let index = self.bots_created;
        self.bots_created += 1;
        let color = self.bot_color(index);
        let name = format!("Bot{}", self.bots_created);
        let face = self.random_face();
        let spawn = self.safe_spawn_point();
        let direction = self.random_direction();
        let snake = Snake::new(
            AgentKind::Bot,
            name,
            face,
            color,
            spawn,
            direction,
            self.config.min_length,
        );
        let id = self.agents.insert(snake);
        self.roster.push(id);
        self.minds.insert(id, BotMind::default());
        id
    }

    /// Rejection-samples a spawn point outside the central safe zone.
    fn safe_spawn_point(&mut self) -> Point {
        let margin = self.config.spawn_margin;
        let width = self.config.world_width;
        let height = self.config.world_height;
        loop {
            let candidate = Point::new(
                self.rng.random_range(margin..width - margin),
                self.rng.random_range(margin..height - margin),
            );
            if !self.in_safe_zone(candidate) {
                return candidate;
            }
        }
    }

    fn in_safe_zone(&self, point: Point) -> bool {
        let half = self.config.safe_zone_half;
        (point.x - self.config.world_width * 0.5).abs() <= half
            && (point.y - self.config.world_height * 0.5).abs() <= half
    }

    fn random_direction(&mut self) -> Heading {
        let x = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let y = if self.rng.random_bool(0.5) { 1.0 } else { -1.0 };
        Heading::new(x, y)
    }

    fn random_face(&mut self) -> String {
        SNAKE_FACES[self.rng.random_range(0..SNAKE_FACES.len())].to_owned()
    }

    fn bot_color(&mut self, index: usize) -> Rgb {
        match BOT_PALETTE.get(index) {
            Some(&color) => color,
            None => [
                self.rng.random_range(100..=255),
                self.rng.random_range(100..=255),
                self.rng.random_range(100..=255),
            ],
        }
    }

    fn random_food_point(&mut self) -> Point {
        Point::new(
            self.rng.random_range(0.0..self.config.world_width),
            self.rng.random_range(0.0..self.config.world_height),
        )
    }

    fn push_summary(&mut self, deaths: usize) {
        if self.config.history_capacity == 0 {
            return;
        }
        let summary = TickSummary {
            tick: self.tick,
            alive_bots: self.alive_bot_count(),
            food_count: self.food.len(),
            deaths,
            player_score: self.player_score(),
            player_alive: self.agents.get(self.player).is_some_and(|snake| snake.alive),
        };
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(summary);
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub fn config(&self) -> &SlitherConfig {
        &self.config
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Simulated seconds elapsed since boot.
    #[must_use]
    pub const fn time(&self) -> f64 {
        self.time
    }

    /// Borrow the world RNG mutably for deterministic sampling.
    #[must_use]
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    /// Handle of the player snake.
    #[must_use]
    pub const fn player_id(&self) -> AgentId {
        self.player
    }

    /// Borrow a snake by handle.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Snake> {
        self.agents.get(id)
    }

    /// Mutably borrow a snake by handle.
    #[must_use]
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Snake> {
        self.agents.get_mut(id)
    }

    /// Iterate snakes in roster order (player first).
    pub fn agents(&self) -> impl Iterator<Item = (AgentId, &Snake)> {
        self.roster
            .iter()
            .filter_map(|&id| self.agents.get(id).map(|snake| (id, snake)))
    }

    /// Number of snakes currently registered, dead ones included.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Number of living bots.
    #[must_use]
    pub fn alive_bot_count(&self) -> usize {
        self.agents
            .values()
            .filter(|snake| snake.kind.is_bot() && snake.alive)
            .count()
    }

    /// Number of food items currently in the world.
    #[must_use]
    pub fn food_count(&self) -> usize {
        self.food.len()
    }

    /// Iterate the food registry.
    pub fn food_items(&self) -> impl Iterator<Item = &FoodItem> {
        self.food.values()
    }

    /// Steering memory of one bot, if it has any.
    #[must_use]
    pub fn bot_mind(&self, id: AgentId) -> Option<&BotMind> {
        self.minds.get(id)
    }

    /// Player score: whole segments gained over the baseline length.
    #[must_use]
    pub fn player_score(&self) -> u32 {
        self.agents
            .get(self.player)
            .map_or(0, |snake| snake.score(self.config.min_length))
    }

    /// Best score seen so far, including the persisted one loaded at boot.
    #[must_use]
    pub const fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Iterate over retained tick summaries.
    pub fn history(&self) -> impl Iterator<Item = &TickSummary> {
        self.history.iter()
    }

    /// Snapshot every snake for rendering, in roster order.
    #[must_use]
    pub fn agent_snapshots(&self) -> Vec<AgentSnapshot> {
        self.roster
            .iter()
            .filter_map(|&id| {
                self.agents.get(id).map(|snake| AgentSnapshot {
                    id,
                    name: snake.name.clone(),
                    face: snake.face.clone(),
                    color: snake.color,
                    body: snake.body.iter().copied().collect(),
                    alive: snake.alive,
                    is_player: !snake.kind.is_bot(),
                })
            })
            .collect()
    }

    /// Snapshot every food item for rendering.
    #[must_use]
    pub fn food_snapshots(&self) -> Vec<FoodSnapshot> {
        self.food
            .values()
            .map(|item| FoodSnapshot {
                position: item.position,
                color: item.color,
            })
            .collect()
    }
}
