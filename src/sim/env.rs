//! Episode loop
//!
//! Per step, for one agent and in this order: kinematics, scene redraw,
//! radar sensing, collision policy, reward. The reward function always sees
//! the radar readings of the same tick.
//!
//! Every accepted `step` call advances the tick counter by one, so with N
//! agents stepped in index order a full round is N ticks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::action::Action;
use super::car::{AgentState, Car, DeathCause, Direction, InitialPose};
use super::collision::CollisionPolicy;
use super::radar::RaySensorArray;
use super::track::Track;
use crate::error::SimError;
use crate::renderer::scene::{draw_car, draw_radar, draw_track};
use crate::renderer::{PixelBuffer, Rgba};
use crate::settings::{AgentSpec, RenderMode, Settings};

/// Radar distances, one per radar angle
pub type Observation = Vec<f32>;

/// Injected reward: pure and cheap, it runs inside the step
pub type RewardFn = Box<dyn Fn(&AgentState<'_>) -> f32>;

/// 1 while alive, 0 once dead
pub fn default_reward(state: &AgentState<'_>) -> f32 {
    if state.alive { 1.0 } else { 0.0 }
}

/// Lifecycle of the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvPhase {
    /// Constructed or reset, no tick yet
    Ready,
    /// At least one tick applied since the last reset
    Running,
    /// Surfaces released; no more ticks
    Closed,
}

/// Auxiliary per-step data
#[derive(Debug, Clone, PartialEq)]
pub struct StepInfo {
    pub agent: usize,
    pub tick: u64,
    pub direction: Direction,
    pub rotation_rate: f32,
    pub speed: f32,
    /// Reward accumulated this episode
    pub total_reward: f32,
    /// Fraction of the loop at the nearest anchor
    pub progress: f32,
    pub death_cause: Option<DeathCause>,
    /// Agent is disabled and was not simulated
    pub skipped: bool,
}

/// Outcome of one `step`
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub observation: Observation,
    /// Reward earned by this tick alone
    pub reward: f32,
    pub terminated: bool,
    pub info: StepInfo,
    /// RGB bytes of the surface, when `require_pixel` is set
    pub pixels: Option<Vec<u8>>,
}

/// Cooperative quit request, observed between ticks
#[derive(Debug, Clone, Default)]
pub struct QuitHandle(Arc<AtomicBool>);

impl QuitHandle {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Sleeps until the next tick boundary
#[derive(Debug)]
struct TickPacer {
    period: Option<Duration>,
    deadline: Option<Instant>,
}

impl TickPacer {
    fn new(tick_rate: Option<u32>) -> Self {
        Self {
            period: tick_rate.map(|hz| Duration::from_secs_f64(1.0 / hz as f64)),
            deadline: None,
        }
    }

    fn wait(&mut self) {
        let Some(period) = self.period else {
            return;
        };
        let now = Instant::now();
        if let Some(deadline) = self.deadline {
            if deadline > now {
                thread::sleep(deadline - now);
            }
        }
        // Fell behind: restart from now instead of bursting to catch up
        let base = self.deadline.filter(|&d| d > now).unwrap_or(now);
        self.deadline = Some(base + period);
    }

    fn restart(&mut self) {
        self.deadline = None;
    }
}

/// Multi-agent driving environment
pub struct Environment {
    settings: Settings,
    track: Track,
    /// Track drawn once; copied under the cars every step
    track_layer: PixelBuffer,
    /// Surface radars and probes read from
    surface: PixelBuffer,
    agents: Vec<Car>,
    radar: RaySensorArray,
    collision: CollisionPolicy,
    reward_fn: RewardFn,
    tick_count: u64,
    phase: EnvPhase,
    pacer: TickPacer,
    quit: QuitHandle,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("track_seed", &self.track.seed)
            .field("agents", &self.agents.len())
            .field("tick_count", &self.tick_count)
            .field("phase", &self.phase)
            .finish()
    }
}

impl Environment {
    /// Build with the default reward (1 per tick alive)
    pub fn new(settings: Settings) -> Result<Self, SimError> {
        Self::with_reward(settings, default_reward)
    }

    /// Build with an injected reward function
    pub fn with_reward<F>(settings: Settings, reward_fn: F) -> Result<Self, SimError>
    where
        F: Fn(&AgentState<'_>) -> f32 + 'static,
    {
        settings.validate()?;
        let (seed, complexity) = settings.track.resolve()?;
        let track = Track::generate(seed, complexity, settings.canvas)?;

        let (width, height) = settings.canvas;
        let mut track_layer = PixelBuffer::new(width, height);
        draw_track(&mut track_layer, &track);

        let radar = RaySensorArray::new(
            settings.radar.count,
            settings.radar.spread,
            settings.radar.max_range,
        );
        let collision = CollisionPolicy::new(&settings.collision, settings.canvas);

        let pose = start_pose(&settings, &track);
        let mut rng = Pcg32::seed_from_u64(seed);
        let agents = settings
            .agents
            .iter()
            .map(|spec| {
                Car::new(
                    spec.id.clone(),
                    paint(spec, &mut rng),
                    pose,
                    settings.car.move_factor,
                    radar.angles.clone(),
                )
            })
            .collect();

        log::info!(
            "Environment ready: {} agent(s), track seed {}, {:?} render, tick rate {:?}",
            settings.agents.len(),
            seed,
            settings.render_mode,
            settings.tick_rate
        );

        let mut env = Self {
            surface: track_layer.clone(),
            track_layer,
            track,
            agents,
            radar,
            collision,
            reward_fn: Box::new(reward_fn),
            tick_count: 0,
            phase: EnvPhase::Ready,
            pacer: TickPacer::new(settings.tick_rate),
            quit: QuitHandle::default(),
            settings,
        };
        env.redraw_scene();
        Ok(env)
    }

    /// Swap the reward function (takes effect on the next step)
    pub fn set_reward_fn<F>(&mut self, reward_fn: F)
    where
        F: Fn(&AgentState<'_>) -> f32 + 'static,
    {
        self.reward_fn = Box::new(reward_fn);
    }

    /// Restore every agent and zero the tick counter. The track is reused;
    /// use `regenerate_track` for a new one.
    pub fn reset(&mut self) -> Result<(Vec<Observation>, Vec<StepInfo>), SimError> {
        self.ensure_open()?;
        self.tick_count = 0;
        for agent in &mut self.agents {
            agent.reset();
        }
        self.pacer.restart();
        self.phase = EnvPhase::Ready;
        self.redraw_scene();
        log::info!("Environment reset (track seed {})", self.track.seed);

        let observations = self.agents.iter().map(|a| a.radar_distances.clone()).collect();
        let infos = (0..self.agents.len()).map(|i| self.info(i, false)).collect();
        Ok((observations, infos))
    }

    /// Replace the track with a freshly generated one and reset
    pub fn regenerate_track(&mut self, seed: u64) -> Result<(), SimError> {
        self.ensure_open()?;
        let track = Track::generate(seed, self.track.complexity, self.settings.canvas)?;
        draw_track(&mut self.track_layer, &track);
        self.track = track;

        let pose = start_pose(&self.settings, &self.track);
        for agent in &mut self.agents {
            agent.set_initial_pose(pose);
        }
        self.reset()?;
        Ok(())
    }

    /// Decode a raw action vector, then step. Bad vectors leave the tick unapplied.
    pub fn step_encoded(&mut self, agent: usize, bits: &[f32]) -> Result<StepResult, SimError> {
        let action = Action::from_one_hot(bits)?;
        self.step(agent, action)
    }

    /// Advance one agent by one tick
    pub fn step(&mut self, index: usize, action: Action) -> Result<StepResult, SimError> {
        self.ensure_open()?;
        if self.quit.is_requested() {
            self.close();
            return Err(SimError::Closed);
        }
        let count = self.agents.len();
        if index >= count {
            return Err(SimError::AgentIndex { index, count });
        }

        self.tick_count += 1;
        self.phase = EnvPhase::Running;

        let car = &self.agents[index];
        if car.disabled || !car.alive {
            let skipped = car.disabled;
            self.pacer.wait();
            return Ok(self.result(index, 0.0, skipped));
        }

        self.agents[index].apply_action(action);
        self.redraw_scene();

        let (position, heading) = (self.agents[index].position, self.agents[index].heading);
        let scan = self.radar.sense(position, heading, &self.surface);
        let touched = self
            .collision
            .near_field
            .as_ref()
            .is_some_and(|probe| probe.touches(&self.surface, position, heading));

        let car = &mut self.agents[index];
        match scan {
            Ok(scan) => car.record_scan(scan),
            Err(failure) => {
                log::debug!("Agent {} sensing failure: {}", car.id, failure);
                car.radar_distances.fill(0.0);
                car.radar_hits.fill(position);
                car.kill(DeathCause::SensorEscape);
            }
        }
        if let Some(cause) = self.collision.evaluate(&car.radar_distances, car.position) {
            car.kill(cause);
        }
        if touched {
            car.kill(DeathCause::NearFieldContact);
        }

        let reward = (self.reward_fn)(&car.state());
        car.reward += reward;

        self.pacer.wait();
        Ok(self.result(index, reward, false))
    }

    /// Step every agent once, in index order.
    ///
    /// Stops at the first error; agents before it keep the tick they already took.
    pub fn step_all(&mut self, actions: &[Action]) -> Result<Vec<StepResult>, SimError> {
        if actions.len() != self.agents.len() {
            return Err(SimError::AgentCount {
                expected: self.agents.len(),
                got: actions.len(),
            });
        }
        actions
            .iter()
            .enumerate()
            .map(|(i, &action)| self.step(i, action))
            .collect()
    }

    /// Draw track, cars and (optionally) radar rays. Simulation state is untouched.
    pub fn render(&mut self) -> Result<&PixelBuffer, SimError> {
        self.ensure_open()?;
        self.surface.copy_from(&self.track_layer);
        for car in self.agents.iter().filter(|c| !c.disabled) {
            draw_car(&mut self.surface, car);
            if self.settings.show_radar && car.alive {
                draw_radar(&mut self.surface, car);
            }
        }
        Ok(&self.surface)
    }

    /// Release the surfaces; later calls fail with `SimError::Closed`
    pub fn close(&mut self) {
        if self.phase != EnvPhase::Closed {
            self.phase = EnvPhase::Closed;
            self.surface = PixelBuffer::new(0, 0);
            self.track_layer = PixelBuffer::new(0, 0);
            log::info!("Environment closed after {} ticks", self.tick_count);
        }
    }

    /// Handle another thread (or a window event loop) can use to stop the loop
    pub fn quit_handle(&self) -> QuitHandle {
        self.quit.clone()
    }

    /// Skip an agent in stepping and rendering until the next reset
    pub fn disable(&mut self, index: usize) -> Result<(), SimError> {
        let count = self.agents.len();
        let car = self
            .agents
            .get_mut(index)
            .ok_or(SimError::AgentIndex { index, count })?;
        car.disabled = true;
        Ok(())
    }

    pub fn observation(&self, index: usize) -> Result<Observation, SimError> {
        self.agents
            .get(index)
            .map(|a| a.radar_distances.clone())
            .ok_or(SimError::AgentIndex {
                index,
                count: self.agents.len(),
            })
    }

    pub fn agents(&self) -> &[Car] {
        &self.agents
    }

    pub fn track(&self) -> &Track {
        &self.track
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn phase(&self) -> EnvPhase {
        self.phase
    }

    pub fn surface(&self) -> &PixelBuffer {
        &self.surface
    }

    pub fn is_windowed(&self) -> bool {
        self.settings.render_mode == RenderMode::Window
    }

    pub fn all_terminated(&self) -> bool {
        self.agents.iter().all(|a| a.disabled || !a.alive)
    }

    fn ensure_open(&self) -> Result<(), SimError> {
        if self.phase == EnvPhase::Closed {
            Err(SimError::Closed)
        } else {
            Ok(())
        }
    }

    /// Track layer plus every active car body
    fn redraw_scene(&mut self) {
        self.surface.copy_from(&self.track_layer);
        for car in self.agents.iter().filter(|c| !c.disabled) {
            draw_car(&mut self.surface, car);
        }
    }

    fn info(&self, index: usize, skipped: bool) -> StepInfo {
        let car = &self.agents[index];
        StepInfo {
            agent: index,
            tick: self.tick_count,
            direction: car.direction,
            rotation_rate: car.rotation_rate,
            speed: car.speed(),
            total_reward: car.reward,
            progress: self.track.progress(car.position),
            death_cause: car.death_cause,
            skipped,
        }
    }

    fn result(&self, index: usize, reward: f32, skipped: bool) -> StepResult {
        let car = &self.agents[index];
        StepResult {
            observation: car.radar_distances.clone(),
            reward,
            terminated: !car.alive,
            info: self.info(index, skipped),
            pixels: self
                .settings
                .require_pixel
                .then(|| self.surface.to_rgb_bytes()),
        }
    }
}

fn start_pose(settings: &Settings, track: &Track) -> InitialPose {
    let (position, heading) = track.start_pose();
    InitialPose {
        position,
        heading,
        speed: settings.car.initial_speed,
        rotation_rate: settings.car.initial_rotation_rate,
    }
}

/// Configured color, or a seeded random one that is never the boundary color
fn paint(spec: &AgentSpec, rng: &mut Pcg32) -> Rgba {
    let [r, g, b] = spec
        .color
        .unwrap_or_else(|| [rng.random(), rng.random(), rng.random()]);
    let color = Rgba::rgb(r, g, b);
    if color == Rgba::BOUNDARY {
        Rgba::rgb(r, g.wrapping_sub(1), b)
    } else {
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::renderer::Surface;
    use crate::renderer::shapes::fill_convex_polygon;
    use crate::settings::{TrackMode, TrackSource};
    use glam::Vec2;

    fn env_with(agents: usize) -> Environment {
        Environment::new(Settings::default().with_agent_count(agents)).unwrap()
    }

    /// Swap the track layer for a hand-made one and place agent 0
    fn stage(env: &mut Environment, layer: PixelBuffer, position: Vec2, heading: f32) {
        env.track_layer = layer;
        let mut pose = env.agents[0].initial_pose();
        pose.position = position;
        pose.heading = heading;
        env.agents[0].set_initial_pose(pose);
        env.reset().unwrap();
    }

    fn open_field() -> PixelBuffer {
        let mut layer = PixelBuffer::new(800, 700);
        layer.fill(Rgba::ROAD);
        layer
    }

    /// Horizontal road strip of the given half-width around y = 350
    fn corridor(half_width: f32) -> PixelBuffer {
        let mut layer = PixelBuffer::new(800, 700);
        layer.fill(Rgba::BOUNDARY);
        let strip = [
            Vec2::new(0.0, 350.0 - half_width),
            Vec2::new(799.0, 350.0 - half_width),
            Vec2::new(799.0, 350.0 + half_width),
            Vec2::new(0.0, 350.0 + half_width),
        ];
        fill_convex_polygon(&mut layer, &strip, Rgba::ROAD);
        layer
    }

    #[test]
    fn test_invalid_settings_abort_construction() {
        let err = Environment::new(Settings::default().with_agent_count(0)).unwrap_err();
        assert!(matches!(err, SimError::Config(_)));

        let settings = Settings {
            track: TrackSource::Generated {
                seed: 1,
                complexity: 2,
            },
            ..Settings::default()
        };
        let err = Environment::new(settings).unwrap_err();
        assert!(matches!(err, SimError::Generation(_)));
    }

    #[test]
    fn test_reset_returns_zeroed_observations() {
        let mut env = env_with(2);
        let (obs, infos) = env.reset().unwrap();
        assert_eq!(obs, vec![vec![0.0; 5]; 2]);
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[1].tick, 0);
        assert_eq!(env.phase(), EnvPhase::Ready);
    }

    #[test]
    fn test_step_on_generated_track() {
        let mut env = env_with(1);
        let result = env.step(0, Action::Idle).unwrap();
        assert_eq!(result.observation.len(), 5);
        assert!(!result.terminated, "{:?}", result.info.death_cause);
        assert_eq!(result.reward, 1.0);
        assert_eq!(env.tick_count(), 1);
        assert_eq!(env.phase(), EnvPhase::Running);
        // Started on the road centerline: nothing is within reach of the forward ray's origin
        assert!(result.observation.iter().all(|&d| d > 0.0));
    }

    #[test]
    fn test_open_interior_reads_max_range() {
        let mut env = env_with(1);
        stage(&mut env, open_field(), Vec2::new(400.0, 350.0), 0.0);
        let result = env.step(0, Action::Idle).unwrap();
        assert_eq!(result.observation, vec![200.0; 5]);
        assert!(!result.terminated);
    }

    #[test]
    fn test_boxed_in_dies_same_tick() {
        let mut env = env_with(1);
        stage(&mut env, corridor(10.0), Vec2::new(100.0, 350.0), 0.0);
        let result = env.step(0, Action::Idle).unwrap();
        assert!(result.terminated);
        assert_eq!(result.info.death_cause, Some(DeathCause::BoxedIn));
        assert_eq!(result.reward, 0.0);
    }

    #[test]
    fn test_wide_corridor_is_safe() {
        let mut env = env_with(1);
        stage(&mut env, corridor(40.0), Vec2::new(100.0, 350.0), 0.0);
        let result = env.step(0, Action::Idle).unwrap();
        assert!(!result.terminated);
        assert_eq!(result.observation[2], 200.0);
    }

    #[test]
    fn test_leaving_canvas_kills() {
        let mut env = env_with(1);
        // One move lands at x = -0.3: still sampled as column 0, but off the canvas
        stage(&mut env, open_field(), Vec2::new(-9.9, 350.0), 0.0);
        let result = env.step(0, Action::Idle).unwrap();
        assert!(result.terminated);
        assert_eq!(result.observation, vec![200.0; 5]);
        assert_eq!(result.info.death_cause, Some(DeathCause::OutOfBounds));
        assert_eq!(result.reward, 0.0);
    }

    #[test]
    fn test_ray_leaving_surface_kills() {
        let mut env = env_with(1);
        stage(&mut env, open_field(), Vec2::new(795.0, 350.0), 0.0);
        let result = env.step(0, Action::Idle).unwrap();
        assert!(result.terminated);
        assert_eq!(result.info.death_cause, Some(DeathCause::SensorEscape));
    }

    #[test]
    fn test_sensing_failure_is_absorbed() {
        let mut env = env_with(1);
        // Rays toward the top edge leave the surface before max range
        stage(&mut env, open_field(), Vec2::new(400.0, 60.0), 0.0);
        let result = env.step(0, Action::Idle).unwrap();
        assert!(result.terminated);
        assert_eq!(result.info.death_cause, Some(DeathCause::SensorEscape));
    }

    #[test]
    fn test_dead_agent_accrues_no_reward() {
        let mut env = env_with(1);
        stage(&mut env, corridor(10.0), Vec2::new(100.0, 350.0), 0.0);
        env.step(0, Action::Idle).unwrap();
        let position = env.agents()[0].position;

        let result = env.step(0, Action::SteerLeft).unwrap();
        assert!(result.terminated);
        assert_eq!(result.reward, 0.0);
        assert_eq!(result.info.total_reward, 0.0);
        assert_eq!(env.agents()[0].position, position);
    }

    #[test]
    fn test_reward_sees_current_radar() {
        let mut env = Environment::with_reward(Settings::default(), |s| {
            s.radar_distances.iter().sum()
        })
        .unwrap();
        let result = env.step(0, Action::Idle).unwrap();
        let sum: f32 = result.observation.iter().sum();
        assert!(sum > 0.0);
        assert_eq!(result.reward, sum);
        assert_eq!(result.info.total_reward, sum);
    }

    #[test]
    fn test_reset_restores_construction_state() {
        let mut env = env_with(2);
        let fresh: Vec<Car> = env.agents().to_vec();

        env.step(0, Action::HighSpeed).unwrap();
        env.step(1, Action::SteerLeft).unwrap();
        env.step(0, Action::SteerRight).unwrap();
        env.disable(1).unwrap();

        env.reset().unwrap();
        assert_eq!(env.agents(), fresh.as_slice());
        assert_eq!(env.tick_count(), 0);
    }

    #[test]
    fn test_invalid_action_not_applied() {
        let mut env = env_with(1);
        let err = env.step_encoded(0, &[1.0, 0.0]).unwrap_err();
        assert!(matches!(err, SimError::Action(ActionError::WrongLength { .. })));
        assert_eq!(env.tick_count(), 0);

        let result = env.step_encoded(0, &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        assert!((result.info.speed - 1.6).abs() < 1e-6);
        assert_eq!(result.info.rotation_rate, 7.0);
    }

    #[test]
    fn test_agent_index_out_of_range() {
        let mut env = env_with(1);
        assert!(matches!(
            env.step(3, Action::Idle),
            Err(SimError::AgentIndex { index: 3, count: 1 })
        ));
    }

    #[test]
    fn test_disabled_agent_is_skipped() {
        let mut env = env_with(2);
        env.disable(1).unwrap();
        let before = env.agents()[1].clone();
        let result = env.step(1, Action::Straight).unwrap();
        assert!(result.info.skipped);
        assert_eq!(result.reward, 0.0);
        assert_eq!(env.agents()[1], before);
    }

    #[test]
    fn test_step_all_counts_one_tick_per_agent() {
        let mut env = env_with(3);
        let results = env.step_all(&[Action::Idle; 3]).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(env.tick_count(), 3);
        assert_eq!(results[2].info.tick, 3);

        assert!(matches!(
            env.step_all(&[Action::Idle; 2]),
            Err(SimError::AgentCount { expected: 3, got: 2 })
        ));
        assert_eq!(env.tick_count(), 3);
    }

    #[test]
    fn test_step_all_stops_at_quit() {
        let mut env = env_with(2);
        env.quit_handle().request();
        assert!(matches!(env.step_all(&[Action::Idle; 2]), Err(SimError::Closed)));
        assert_eq!(env.tick_count(), 0);
        assert_eq!(env.phase(), EnvPhase::Closed);
    }

    #[test]
    fn test_paced_steps_hold_tick_rate() {
        let mut settings = Settings::default();
        settings.tick_rate = Some(100);
        let mut env = Environment::new(settings).unwrap();
        // Dead after the first tick: counted ticks are paced all the same
        stage(&mut env, corridor(10.0), Vec2::new(100.0, 350.0), 0.0);

        let start = Instant::now();
        for _ in 0..6 {
            env.step(0, Action::Idle).unwrap();
        }
        assert!(env.agents()[0].death_cause.is_some());
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_late_tick_restarts_schedule() {
        let mut pacer = TickPacer::new(Some(100));
        pacer.wait();
        thread::sleep(Duration::from_millis(50));

        // Overdue: no sleep, and no burst of catch-up ticks afterwards
        let start = Instant::now();
        pacer.wait();
        assert!(start.elapsed() < Duration::from_millis(5));
        let start = Instant::now();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(8));
    }

    #[test]
    fn test_unpaced_without_tick_rate() {
        let mut pacer = TickPacer::new(None);
        let start = Instant::now();
        for _ in 0..100 {
            pacer.wait();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        assert_eq!(pacer.deadline, None);
    }

    #[test]
    fn test_identical_runs_are_deterministic() {
        let actions = [
            Action::Idle,
            Action::SteerLeft,
            Action::MediumSpeed,
            Action::SteerRight,
            Action::Straight,
        ];
        let mut a = env_with(1);
        let mut b = env_with(1);
        for &action in &actions {
            let ra = a.step(0, action).unwrap();
            let rb = b.step(0, action).unwrap();
            assert_eq!(ra, rb);
        }
        assert_eq!(a.agents(), b.agents());
    }

    #[test]
    fn test_render_draws_cars_without_touching_state() {
        let mut settings = Settings::default();
        settings.show_radar = true;
        settings.agents[0].color = Some([200, 0, 200]);
        let mut env = Environment::new(settings).unwrap();
        env.step(0, Action::Idle).unwrap();
        let agents = env.agents().to_vec();

        let surface = env.render().unwrap();
        let car_color = Rgba::rgb(200, 0, 200);
        assert!(surface.pixels().iter().any(|&p| p == car_color));
        assert!(surface.pixels().iter().any(|&p| p == Rgba::RADAR_RAY));
        assert_eq!(env.agents(), agents.as_slice());
    }

    #[test]
    fn test_pixels_attached_when_required() {
        let mut settings = Settings::default();
        settings.require_pixel = true;
        let mut env = Environment::new(settings).unwrap();
        let result = env.step(0, Action::Idle).unwrap();
        assert_eq!(result.pixels.map(|p| p.len()), Some(800 * 700 * 3));
    }

    #[test]
    fn test_close_and_quit() {
        let mut env = env_with(1);
        env.close();
        assert_eq!(env.phase(), EnvPhase::Closed);
        assert!(matches!(env.step(0, Action::Idle), Err(SimError::Closed)));
        assert!(matches!(env.reset(), Err(SimError::Closed)));
        assert!(env.render().is_err());

        let mut env = env_with(1);
        env.quit_handle().request();
        assert!(matches!(env.step(0, Action::Idle), Err(SimError::Closed)));
        assert_eq!(env.surface().width(), 0);
    }

    #[test]
    fn test_regenerate_track_moves_start() {
        let mut env = env_with(1);
        let old_start = env.agents()[0].initial_pose();
        env.step(0, Action::Idle).unwrap();

        env.regenerate_track(987_654).unwrap();
        assert_eq!(env.track().seed, 987_654);
        assert_eq!(env.tick_count(), 0);
        let new_start = env.agents()[0].initial_pose();
        assert_ne!(old_start.position, new_start.position);
        assert_eq!(env.agents()[0].position, new_start.position);
    }

    #[test]
    fn test_catalogue_tracks_are_stable() {
        let settings = Settings {
            track: TrackSource::Catalogue {
                mode: TrackMode::Evaluation,
                index: 1,
            },
            ..Settings::default()
        };
        let a = Environment::new(settings.clone()).unwrap();
        let b = Environment::new(settings).unwrap();
        assert_eq!(a.track(), b.track());
    }
}
