//! Wave director.
//!
//! Waves start on a fixed timetable. Each wave trickles in soldiers for its
//! duration; later waves trickle faster, mix in grenadiers from wave 3 and
//! send bomber jets from wave 5.

use rand::Rng;

/// Grace period before the first wave.
pub const FIRST_WAVE_DELAY: f32 = 6.0;
/// How long a wave keeps spawning.
pub const WAVE_DURATION: f32 = 30.0;
/// Quiet time between the end of a wave and the start of the next.
pub const WAVE_GAP: f32 = 15.0;
/// Waves from this one on include grenadiers.
pub const GRENADIER_WAVE: u32 = 3;
/// Waves from this one on include jets.
pub const JET_WAVE: u32 = 5;

/// One enemy the director wants in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveSpawn {
    Soldier { grenadier: bool },
    /// A bomber sent across the main compute core. `from_left` picks the
    /// map edge it enters from.
    Jet { from_left: bool },
}

/// Timer-driven, ever-escalating enemy spawner.
#[derive(Debug, Clone)]
pub struct WaveDirector {
    // ── Timetable ───────────────────────────────────────────────────────
    /// Waves started so far; the current wave's number while one runs.
    pub wave: u32,
    next_wave_time: f32,
    wave_end: f32,

    // ── Per-wave spawning ───────────────────────────────────────────────
    soldier_timer: f32,
    jet_timer: f32,
    /// Soldiers spawned in the current wave.
    pub soldiers_spawned: u32,
    pub jets_spawned: u32,
}

impl Default for WaveDirector {
    fn default() -> Self {
        Self::new()
    }
}

impl WaveDirector {
    pub fn new() -> Self {
        Self {
            wave: 0,
            next_wave_time: FIRST_WAVE_DELAY,
            wave_end: 0.0,
            soldier_timer: 0.0,
            jet_timer: 0.0,
            soldiers_spawned: 0,
            jets_spawned: 0,
        }
    }

    /// Seconds between soldiers during wave `wave`.
    pub fn soldier_interval(wave: u32) -> f32 {
        (3.0 - 0.4 * wave.saturating_sub(1) as f32).max(0.75)
    }

    /// Seconds between jets during wave `wave`.
    pub fn jet_interval(wave: u32) -> f32 {
        (12.0 - wave as f32).max(4.0)
    }

    pub fn in_wave(&self, elapsed: f32) -> bool {
        self.wave > 0 && elapsed < self.wave_end
    }

    /// Seconds until the next wave starts.
    pub fn countdown(&self, elapsed: f32) -> f32 {
        (self.next_wave_time - elapsed).max(0.0)
    }

    pub fn next_wave(&self) -> u32 {
        self.wave + 1
    }

    fn start_wave(&mut self, elapsed: f32) {
        self.wave += 1;
        self.wave_end = elapsed + WAVE_DURATION;
        self.next_wave_time = self.wave_end + WAVE_GAP;
        self.soldier_timer = 0.0;
        self.jet_timer = Self::jet_interval(self.wave) * 0.5;
        self.soldiers_spawned = 0;
        self.jets_spawned = 0;
        log::info!(
            "Wave {} begins: a soldier every {:.2}s{}{}",
            self.wave,
            Self::soldier_interval(self.wave),
            if self.wave >= GRENADIER_WAVE { ", grenadiers" } else { "" },
            if self.wave >= JET_WAVE { ", jets" } else { "" },
        );
    }

    /// Advance to `elapsed` seconds of game time and return what should
    /// spawn this tick.
    pub fn update(&mut self, elapsed: f32, dt: f32, rng: &mut impl Rng) -> Vec<WaveSpawn> {
        let mut spawns = Vec::new();
        if elapsed >= self.next_wave_time {
            self.start_wave(elapsed);
        }
        if !self.in_wave(elapsed) {
            return spawns;
        }

        self.soldier_timer -= dt;
        while self.soldier_timer <= 0.0 {
            self.soldier_timer += Self::soldier_interval(self.wave);
            self.soldiers_spawned += 1;
            let grenadier = self.wave >= GRENADIER_WAVE && self.soldiers_spawned % 3 == 0;
            spawns.push(WaveSpawn::Soldier { grenadier });
        }

        if self.wave >= JET_WAVE {
            self.jet_timer -= dt;
            if self.jet_timer <= 0.0 {
                self.jet_timer += Self::jet_interval(self.wave);
                self.jets_spawned += 1;
                spawns.push(WaveSpawn::Jet {
                    from_left: rng.gen_bool(0.5),
                });
            }
        }
        spawns
    }
}
