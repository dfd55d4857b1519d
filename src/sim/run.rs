//! A single descent, from launch to the run-over signal
//!
//! `Run` owns every subsystem and drives them in a fixed order each frame:
//! progression, input, scroll, sonar, torpedoes, spawning, enemies,
//! collisions, milestones. Everything a collaborator needs to react to is
//! reported as a [`RunEvent`].

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::FrameDelta;
use super::collision::{self, Contact};
use super::events::{RunEvent, SoundKey};
use super::jellyfish::{Jellyfish, JellyfishFate, JellyfishSpawner};
use super::player::{HitOutcome, Player};
use super::powerup::{PowerUp, PowerUpError};
use super::progress::Progress;
use super::snapshot::{JellyfishView, PlayerView, RenderSnapshot, TorpedoView, ambient_light};
use super::sonar::Sonar;
use super::terrain::Terrain;
use super::timer::Timer;
use super::torpedo::{FireError, TorpedoId, TorpedoKind, TorpedoOutcome, TorpedoPool};
use crate::platform::TickInput;
use crate::save::SaveData;
use crate::tuning::Tuning;

/// Where the run is in its life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunPhase {
    Playing,
    /// Hull destroyed; waiting out the transition delay
    GameOver { timer: Timer },
    /// Run-over has been signalled
    Finished,
}

pub struct Run {
    /// Run seed for reproducibility
    pub seed: u64,
    tuning: Tuning,
    rng: Pcg32,
    terrain: Terrain,
    player: Player,
    sonar: Sonar,
    torpedoes: TorpedoPool,
    enemies: Vec<Jellyfish>,
    spawner: JellyfishSpawner,
    progress: Progress,
    phase: RunPhase,
    /// Power-up choices waiting for an answer
    offer: Option<Vec<PowerUp>>,
    /// Unlocked types (extra torpedoes are drawn from these)
    unlocked: Vec<TorpedoKind>,
    next_enemy_id: u32,
    /// Events raised since the last update
    events: Vec<RunEvent>,
}

impl Run {
    pub fn new(save: &SaveData, tuning: Tuning, terrain: Terrain, seed: u64) -> Self {
        let spawn = Vec2::new(tuning.center_x(), tuning.world_height * 0.2);
        let unlocked = save.unlocked_kinds();
        let loadout = save.loadout();
        log::info!(
            "Starting run (seed {seed}): hull {}, {} torpedoes {:?}",
            save.hull,
            loadout.len(),
            unlocked
        );

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            player: Player::new(spawn, save.hull),
            sonar: Sonar::new(&tuning),
            torpedoes: TorpedoPool::new(&loadout),
            enemies: Vec::new(),
            spawner: JellyfishSpawner::new(&tuning),
            progress: Progress::new(unlocked.clone(), &tuning),
            phase: RunPhase::Playing,
            offer: None,
            unlocked,
            next_enemy_id: 0,
            events: vec![RunEvent::Sound(SoundKey::Background)],
            terrain,
            tuning,
        }
    }

    fn next_enemy_id(&mut self) -> u32 {
        let id = self.next_enemy_id;
        self.next_enemy_id += 1;
        id
    }

    fn world(&self) -> Vec2 {
        Vec2::new(self.tuning.world_width, self.tuning.world_height)
    }

    /// Accepting gameplay input
    fn is_live(&self) -> bool {
        self.phase == RunPhase::Playing && self.progress.is_live()
    }

    /// Advance one frame and return what happened
    pub fn update(&mut self, frame: FrameDelta, input: &TickInput) -> Vec<RunEvent> {
        let dt = frame.secs;

        match self.phase {
            RunPhase::Finished => return std::mem::take(&mut self.events),
            RunPhase::GameOver { mut timer } => {
                for enemy in &mut self.enemies {
                    enemy.fade(dt, self.tuning.game_over_delay);
                }
                if timer.tick(dt) > 0 {
                    self.finish();
                } else {
                    self.phase = RunPhase::GameOver { timer };
                }
                return std::mem::take(&mut self.events);
            }
            RunPhase::Playing => {}
        }

        if input.pause {
            let paused = self.progress.toggle_manual_pause();
            log::info!("Run {}", if paused { "paused" } else { "resumed" });
        }
        if self.progress.is_paused() {
            return std::mem::take(&mut self.events);
        }

        self.progress.advance(frame);

        // Input
        self.progress.accumulate_wheel(input.weapon_scroll);
        self.progress.step_weapon(input.weapon_step);
        let world = self.world();
        self.player
            .steer(input.movement, self.tuning.player_speed, dt, world);
        self.player.update(dt);
        if input.sonar {
            self.activate_sonar();
        }
        if let Some(target) = input.fire_target {
            // Failures are logged by the pool; the HUD keeps its count
            let _ = self.fire(target);
        }

        // World scroll
        let scroll = frame.scroll(self.tuning.scroll_speed);
        self.terrain.scroll(scroll);
        self.terrain.tick_reveal(dt);

        // Sonar
        if self.sonar.update(dt, scroll) {
            log::debug!("Sonar pulse reached its range");
        }
        let regen_ticks = self.progress.tick_regen(dt);
        if regen_ticks > 0 {
            let per_tick = self.tuning.sonar_regen_amount + self.sonar.recharge_bonus;
            self.sonar.recharge(per_tick * regen_ticks as f32);
        }

        // Torpedoes
        for (id, outcome) in self.torpedoes.update(dt, scroll, &self.terrain, world) {
            if let TorpedoOutcome::HitTerrain { pos } = outcome {
                self.events.push(RunEvent::TorpedoImpact { torpedo: id, pos });
                self.events.push(RunEvent::ParticleBurst { pos });
            }
        }

        // Spawning
        let spawns = self
            .spawner
            .update(dt, self.progress.depth(), &self.tuning, &mut self.rng);
        for pos in spawns {
            let id = self.next_enemy_id();
            self.enemies.push(Jellyfish::new(id, pos, &self.tuning));
            self.events.push(RunEvent::EnemySpawned { enemy: id });
            log::debug!("Jellyfish {id} spawned at x={:.0}", pos.x);
        }

        self.update_enemies(dt, scroll);
        self.resolve_collisions();

        if let Some(milestone) = self.progress.claim_milestone() {
            self.offer_power_ups(milestone);
        }

        std::mem::take(&mut self.events)
    }

    fn update_enemies(&mut self, dt: f32, scroll: f32) {
        let player_pos = self.player.pos;
        let alerts = self.sonar.alerts_enemies();
        for enemy in &mut self.enemies {
            if alerts
                && self.sonar.is_point_in_range(enemy.pos)
                && enemy.alert(player_pos, &self.tuning, &mut self.rng)
            {
                self.events.push(RunEvent::EnemyAlerted { enemy: enemy.id });
            }
        }

        let mut removed = Vec::new();
        for enemy in &mut self.enemies {
            match enemy.update(dt, scroll, &self.tuning, &mut self.rng) {
                JellyfishFate::Alive => {}
                JellyfishFate::ScrolledAway | JellyfishFate::Dead => removed.push(enemy.id),
            }
        }
        if !removed.is_empty() {
            self.enemies.retain(|e| !removed.contains(&e.id));
            for id in removed {
                log::debug!("Jellyfish {id} removed");
                self.events.push(RunEvent::EnemyRemoved { enemy: id });
            }
        }
    }

    fn resolve_collisions(&mut self) {
        let death = self.tuning.jellyfish_death_secs;
        let mut contacts = collision::resolve_torpedoes(&mut self.torpedoes, &mut self.enemies, death);
        contacts.extend(collision::resolve_player(
            &self.player,
            &self.terrain,
            &mut self.enemies,
            self.tuning.graze_tolerance,
            death,
        ));

        for contact in contacts {
            match contact {
                Contact::TorpedoKill { torpedo, enemy, pos } => {
                    self.events.push(RunEvent::TorpedoImpact { torpedo, pos });
                    self.events.push(RunEvent::EnemyKilled { enemy });
                    self.events.push(RunEvent::ParticleBurst { pos });
                }
                Contact::TorpedoStun { torpedo, enemy, pos } => {
                    self.events.push(RunEvent::TorpedoImpact { torpedo, pos });
                    self.events.push(RunEvent::EnemyStunned { enemy });
                }
                Contact::PlayerRammed { enemy } => {
                    self.events.push(RunEvent::EnemyKilled { enemy });
                    self.hit_player();
                }
                Contact::PlayerTerrain => self.hit_player(),
                Contact::Graze { .. } => {}
            }
        }
    }

    /// Shared damage path for rock and jellyfish contacts
    fn hit_player(&mut self) {
        match self.player.take_hit(self.tuning.invincibility_secs) {
            HitOutcome::Ignored => {}
            HitOutcome::Damaged { hull } => {
                log::info!("Hull hit, {hull} left");
                self.events.push(RunEvent::PlayerHit { hull });
            }
            HitOutcome::Destroyed => {
                self.events.push(RunEvent::PlayerHit { hull: 0 });
                self.begin_game_over();
            }
        }
    }

    /// Stop the world and start the transition delay (once)
    fn begin_game_over(&mut self) {
        if !self.progress.set_game_over() {
            return;
        }
        log::info!("Hull destroyed at depth {:.1}", self.progress.depth());
        self.sonar.shutdown();
        self.terrain.clear_reveal();
        for enemy in &mut self.enemies {
            enemy.freeze_and_fade();
        }
        self.offer = None;
        self.phase = RunPhase::GameOver {
            timer: Timer::once(self.tuning.game_over_delay),
        };
    }

    fn finish(&mut self) {
        let score = self.progress.depth();
        log::info!("Run over, score {score:.1}");
        self.teardown();
        self.phase = RunPhase::Finished;
        self.events.push(RunEvent::RunOver { score });
    }

    fn offer_power_ups(&mut self, milestone: f32) {
        let choices = PowerUp::draw(self.tuning.power_up_choices, &mut self.rng);
        log::info!(
            "Milestone {milestone:.0} reached, offering {:?}",
            choices.iter().map(|p| p.key()).collect::<Vec<_>>()
        );
        self.progress.set_power_up_pause(true);
        self.offer = Some(choices.clone());
        self.events.push(RunEvent::PowerUpOffered(choices));
    }

    // === Commands ===

    /// Fire the selected torpedo toward `target`
    pub fn fire(&mut self, target: Vec2) -> Result<TorpedoId, FireError> {
        let kind = self
            .progress
            .selected_weapon()
            .ok_or(FireError::NoWeaponSelected)?;
        self.fire_kind(kind, target)
    }

    /// Fire a specific torpedo type toward `target`
    pub fn fire_kind(&mut self, kind: TorpedoKind, target: Vec2) -> Result<TorpedoId, FireError> {
        if !self.is_live() || !self.player.is_active() {
            return Err(FireError::RunInactive);
        }
        let id = self.torpedoes.fire(kind, self.player.pos, target)?;
        self.events.push(RunEvent::Sound(SoundKey::TorpedoLaunch));
        self.events.push(RunEvent::TorpedoFired { torpedo: id, kind });
        Ok(id)
    }

    /// Emit a sonar pulse from the submarine; false if it could not start
    pub fn activate_sonar(&mut self) -> bool {
        if !self.is_live() || !self.player.is_active() {
            return false;
        }
        if !self.sonar.activate(self.player.pos) {
            return false;
        }
        self.terrain.reveal(self.tuning.sonar_effect_secs);
        self.events.push(RunEvent::Sound(SoundKey::SonarPing));
        self.events.push(RunEvent::TerrainRevealed);
        true
    }

    /// Toggle the pause menu; returns the new manual-pause state
    pub fn toggle_pause(&mut self) -> bool {
        self.progress.toggle_manual_pause()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.progress.set_manual_pause(paused);
    }

    /// Answer the pending power-up offer
    pub fn choose_power_up(&mut self, choice: PowerUp) -> Result<(), PowerUpError> {
        let offer = self.offer.as_ref().ok_or(PowerUpError::NoPendingOffer)?;
        if !offer.contains(&choice) {
            log::warn!("Power-up {} was not offered", choice.key());
            return Err(PowerUpError::NotOffered(choice));
        }
        self.offer = None;
        self.apply_power_up(choice);
        self.progress.set_power_up_pause(false);
        Ok(())
    }

    /// Answer the pending offer by key, as sent by the selection screen
    pub fn choose_power_up_key(&mut self, key: &str) -> Result<(), PowerUpError> {
        match PowerUp::from_key(key) {
            Some(choice) => self.choose_power_up(choice),
            None => {
                log::warn!("Unknown power-up key {key:?}");
                Err(PowerUpError::UnknownKey(key.to_string()))
            }
        }
    }

    fn apply_power_up(&mut self, power_up: PowerUp) {
        log::info!("Applying power-up {}", power_up.name());
        match power_up {
            PowerUp::SonarBoost => self.sonar.radius_bonus += self.tuning.sonar_radius_bonus,
            PowerUp::SilentSonar => self.sonar.go_silent(self.tuning.silent_sonar_secs),
            PowerUp::HullReinforce => self.player.hull += 1,
            PowerUp::PropulsionBoost => self.player.speed_bonus += self.tuning.speed_bonus,
            PowerUp::SonarRecharge => self.sonar.recharge_bonus += self.tuning.recharge_bonus,
            PowerUp::ExtraTorpedo => {
                if let Some(&kind) = self.unlocked.choose(&mut self.rng) {
                    self.torpedoes.add(kind);
                }
            }
            PowerUp::TempShield => self.player.grant_invincibility(self.tuning.shield_secs),
        }
    }

    /// Cancel every pending timer and drop all enemies; safe to call twice
    pub fn teardown(&mut self) {
        self.sonar.shutdown();
        self.terrain.clear_reveal();
        self.torpedoes.teardown();
        for enemy in &mut self.enemies {
            enemy.teardown();
        }
        self.enemies.clear();
        self.player.disable();
        self.offer = None;
    }

    // === Queries ===

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RunPhase::Finished
    }

    pub fn depth(&self) -> f32 {
        self.progress.depth()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn sonar(&self) -> &Sonar {
        &self.sonar
    }

    pub fn torpedoes(&self) -> &TorpedoPool {
        &self.torpedoes
    }

    pub fn enemies(&self) -> &[Jellyfish] {
        &self.enemies
    }

    pub fn terrain(&self) -> &Terrain {
        &self.terrain
    }

    /// Replace the terrain texture once the asset has loaded
    pub fn terrain_mut(&mut self) -> &mut Terrain {
        &mut self.terrain
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn pending_offer(&self) -> Option<&[PowerUp]> {
        self.offer.as_deref()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot {
            player: PlayerView {
                pos: self.player.pos,
                rotation: self.player.rotation,
                alpha: self.player.alpha(),
                hull: self.player.hull,
            },
            sonar_origin: self.sonar.origin(),
            sonar_rings: self.sonar.rings(),
            torpedoes: self
                .torpedoes
                .iter()
                .filter(|t| !t.is_idle() || t.has_light())
                .map(|t| TorpedoView {
                    id: t.id,
                    kind: t.kind,
                    texture_key: t.kind.texture_key(),
                    pos: t.pos,
                    rotation: t.rotation,
                    state: t.state,
                    light: t.light,
                    light_brightness: t.light.map_or(0.0, |l| l.brightness()),
                })
                .collect(),
            jellyfish: self
                .enemies
                .iter()
                .map(|e| JellyfishView {
                    id: e.id,
                    pos: e.pos,
                    anim: e.anim.key(),
                    glowing: e.is_glowing(),
                    stunned: e.is_stunned(),
                    alpha: e.alpha,
                })
                .collect(),
            terrain_tile_y: self.terrain.tile_position_y(),
            terrain_revealed: self.terrain.is_revealed(),
            ambient_light: ambient_light(self.progress.depth()),
            depth: self.progress.depth(),
            energy: self.sonar.energy(),
            ammo: self.torpedoes.remaining_by_kind(),
            selected_weapon: self.progress.selected_weapon(),
            paused: self.progress.is_paused(),
            game_over: self.progress.is_game_over(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::jellyfish::JellyfishState;
    use crate::sim::terrain::TerrainTexture;
    use crate::sim::torpedo::TorpedoState;

    const FRAME: FrameDelta = FrameDelta {
        secs: 0.01666,
        frames: 1.0,
    };

    fn open_water() -> Terrain {
        Terrain::new(Some(TerrainTexture::open_water(64, 64)), 30)
    }

    fn solid_rock() -> Terrain {
        Terrain::new(TerrainTexture::from_alpha(2, 2, vec![255; 4]), 30)
    }

    /// No spawns and no sideways drift, so positions are predictable
    fn calm_tuning() -> Tuning {
        Tuning {
            spawn_base_chance: 0.0,
            spawn_bonus_per_step: 0.0,
            jellyfish_drift_speed: 0.0,
            jellyfish_amplitude: 0.0,
            ..Tuning::default()
        }
    }

    fn run_with(save: SaveData, terrain: Terrain) -> Run {
        Run::new(&save, calm_tuning(), terrain, 1)
    }

    fn place_enemy(run: &mut Run, pos: Vec2) -> u32 {
        let id = run.next_enemy_id();
        run.enemies.push(Jellyfish::new(id, pos, &run.tuning));
        id
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_new_run_from_save() {
        let mut save = SaveData {
            hull: 2,
            slots: 4,
            ..SaveData::default()
        };
        save.torpedoes.shock = true;
        let run = run_with(save, open_water());
        assert_eq!(run.player().hull, 2);
        assert_eq!(run.player().pos, Vec2::new(400.0, 120.0));
        assert_eq!(run.torpedoes().len(), 4);
        assert_eq!(run.torpedoes().remaining(TorpedoKind::Light), 2);
        assert_eq!(run.torpedoes().remaining(TorpedoKind::Shock), 2);
        assert_eq!(run.progress().weapons(), &[TorpedoKind::Light, TorpedoKind::Shock]);
    }

    #[test]
    fn test_shock_torpedo_stuns_drifting_enemy() {
        let mut save = SaveData::default();
        save.torpedoes.shock = true;
        let mut run = run_with(save, open_water());
        run.progress.step_weapon(1);
        let enemy = place_enemy(&mut run, Vec2::new(400.0, 250.0));

        let torpedo = run.fire(Vec2::new(400.0, 500.0)).unwrap();
        let mut stunned = false;
        for _ in 0..60 {
            let events = run.update(FRAME, &idle());
            if events.contains(&RunEvent::EnemyStunned { enemy }) {
                stunned = true;
                break;
            }
        }
        assert!(stunned);
        assert!(matches!(run.enemies()[0].state, JellyfishState::Stunned { .. }));
        assert!(!run.enemies()[0].is_dying());
        assert!(matches!(
            run.torpedoes().get(torpedo).map(|t| t.state),
            Some(TorpedoState::Impact { .. })
        ));
    }

    #[test]
    fn test_hit_with_spare_hull_then_invincible() {
        let save = SaveData {
            hull: 2,
            ..SaveData::default()
        };
        let mut run = run_with(save, open_water());
        run.player.pos.x = 300.0;
        place_enemy(&mut run, Vec2::new(300.0, 110.0));

        let events = run.update(FRAME, &idle());
        assert!(events.contains(&RunEvent::PlayerHit { hull: 1 }));
        assert_eq!(run.player().hull, 1);
        assert!(run.player().is_invincible());
        assert_eq!(run.player().pos.x, 400.0);

        // Second contact during invincibility changes nothing
        place_enemy(&mut run, Vec2::new(400.0, 120.0));
        let events = run.update(FRAME, &idle());
        assert!(!events.iter().any(|e| matches!(e, RunEvent::PlayerHit { .. })));
        assert_eq!(run.player().hull, 1);
        assert_eq!(run.phase(), RunPhase::Playing);
    }

    #[test]
    fn test_game_over_fires_once() {
        let mut run = run_with(SaveData::default(), solid_rock());
        place_enemy(&mut run, Vec2::new(400.0, 110.0));
        run.activate_sonar();

        let events = run.update(FRAME, &idle());
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, RunEvent::PlayerHit { hull: 0 }))
                .count(),
            1
        );
        assert!(matches!(run.phase(), RunPhase::GameOver { .. }));
        assert!(!run.sonar().is_active());
        assert!(!run.terrain().is_revealed());
        let depth = run.depth();

        let mut run_overs = 0;
        for _ in 0..200 {
            for event in run.update(FRAME, &idle()) {
                if let RunEvent::RunOver { score } = event {
                    assert_eq!(score, depth);
                    run_overs += 1;
                }
            }
        }
        assert_eq!(run_overs, 1);
        assert!(run.is_finished());
        assert_eq!(run.depth(), depth);
    }

    #[test]
    fn test_sonar_alerts_enemies_in_range() {
        let mut run = run_with(SaveData::default(), open_water());
        let near = place_enemy(&mut run, Vec2::new(400.0, 300.0));
        let far = place_enemy(&mut run, Vec2::new(400.0, 590.0));
        assert!(run.activate_sonar());
        assert_eq!(run.sonar().energy(), 95.0);

        let mut alerted = Vec::new();
        for _ in 0..60 {
            for event in run.update(FRAME, &idle()) {
                if let RunEvent::EnemyAlerted { enemy } = event {
                    alerted.push(enemy);
                }
            }
        }
        assert_eq!(alerted, vec![near]);
        assert!(run.enemies().iter().any(|e| e.id == far && !e.is_glowing()));
    }

    /// Pulse fast enough to cross the screen in a few frames
    fn fast_sonar_tuning() -> Tuning {
        Tuning {
            sonar_speed: 2000.0,
            scroll_speed: 0.0,
            ..calm_tuning()
        }
    }

    #[test]
    fn test_drifting_enemy_realerts_while_still_glowing() {
        let mut run = Run::new(&SaveData::default(), fast_sonar_tuning(), open_water(), 1);
        run.player.pos.x = 100.0;
        let enemy = place_enemy(&mut run, Vec2::new(400.0, 300.0));
        assert!(run.activate_sonar());

        // The ring arrives within a few frames; pursuit then lasts 2 s, glow 3 s
        let mut alerts = 0;
        for _ in 0..150 {
            for event in run.update(FRAME, &idle()) {
                if event == (RunEvent::EnemyAlerted { enemy }) {
                    alerts += 1;
                }
            }
        }
        assert_eq!(alerts, 1);
        assert_eq!(run.enemies()[0].state, JellyfishState::Drifting);
        assert!(run.enemies()[0].is_glowing());

        assert!(run.activate_sonar());
        let mut realerted = false;
        for _ in 0..20 {
            if run.update(FRAME, &idle()).contains(&RunEvent::EnemyAlerted { enemy }) {
                realerted = true;
                break;
            }
        }
        assert!(realerted);
        assert!(run.enemies()[0].is_alerted());
        assert!(run.enemies()[0].is_glowing());
    }

    #[test]
    fn test_sonar_ring_fades_out_in_snapshot() {
        let mut run = Run::new(&SaveData::default(), fast_sonar_tuning(), open_water(), 1);
        run.activate_sonar();
        for _ in 0..60 {
            if !run.sonar().is_active() {
                break;
            }
            run.update(FRAME, &idle());
        }
        assert!(!run.sonar().is_active());

        let rings = run.snapshot().sonar_rings;
        assert_eq!(rings.len(), 1);
        assert!(rings[0].alpha > 0.0);

        for _ in 0..20 {
            run.update(FRAME, &idle());
        }
        assert!(run.snapshot().sonar_rings.is_empty());
    }

    #[test]
    fn test_terrain_fails_open_until_loaded() {
        let mut run = run_with(SaveData::default(), Terrain::new(None, 30));
        for _ in 0..30 {
            let events = run.update(FRAME, &idle());
            assert!(!events.iter().any(|e| matches!(e, RunEvent::PlayerHit { .. })));
        }
        assert!(!run.terrain().is_loaded());

        let rock = TerrainTexture::from_alpha(2, 2, vec![255; 4]).unwrap();
        run.terrain_mut().set_texture(rock);
        assert!(run.terrain().is_loaded());
        let events = run.update(FRAME, &idle());
        assert!(events.contains(&RunEvent::PlayerHit { hull: 0 }));
        assert!(matches!(run.phase(), RunPhase::GameOver { .. }));
    }

    #[test]
    fn test_set_paused_holds_until_cleared() {
        let mut run = run_with(SaveData::default(), open_water());
        run.set_paused(true);
        run.set_paused(true);
        for _ in 0..10 {
            run.update(FRAME, &idle());
        }
        assert_eq!(run.depth(), 0.0);
        assert!(run.snapshot().paused);

        run.set_paused(false);
        run.update(FRAME, &idle());
        assert!(run.depth() > 0.0);
        assert!(!run.snapshot().paused);
    }

    #[test]
    fn test_silent_sonar_reveals_without_alerting() {
        let mut run = run_with(SaveData::default(), open_water());
        place_enemy(&mut run, Vec2::new(400.0, 350.0));
        run.sonar.go_silent(30.0);
        run.activate_sonar();
        for _ in 0..60 {
            let events = run.update(FRAME, &idle());
            assert!(!events.iter().any(|e| matches!(e, RunEvent::EnemyAlerted { .. })));
        }
        assert!(run.terrain().is_revealed());
    }

    #[test]
    fn test_pause_freezes_the_world() {
        let mut run = run_with(SaveData::default(), open_water());
        run.update(FRAME, &idle());
        let depth = run.depth();
        let tile = run.terrain().tile_position_y();

        let pause = TickInput {
            pause: true,
            ..TickInput::default()
        };
        run.update(FRAME, &pause);
        for _ in 0..100 {
            run.update(FRAME, &idle());
        }
        assert_eq!(run.depth(), depth);
        assert_eq!(run.terrain().tile_position_y(), tile);
        assert_eq!(run.fire(Vec2::ZERO), Err(FireError::RunInactive));
        assert!(!run.activate_sonar());

        run.update(FRAME, &pause);
        run.update(FRAME, &idle());
        assert!(run.depth() > depth);
    }

    #[test]
    fn test_milestone_offer_and_choice() {
        let mut run = run_with(SaveData::default(), open_water());
        let mut offer = None;
        for _ in 0..2100 {
            for event in run.update(FRAME, &idle()) {
                if let RunEvent::PowerUpOffered(choices) = event {
                    offer = Some(choices);
                }
            }
            if offer.is_some() {
                break;
            }
        }
        let offer = offer.unwrap();
        assert_eq!(offer.len(), 3);
        assert!(run.progress().pause_flags().power_up);

        // Manual pause survives the power-up resume
        run.toggle_pause();
        let not_offered = PowerUp::ALL.into_iter().find(|p| !offer.contains(p)).unwrap();
        assert_eq!(run.choose_power_up(not_offered), Err(PowerUpError::NotOffered(not_offered)));
        run.choose_power_up(offer[0]).unwrap();
        assert!(run.progress().is_paused());
        assert!(!run.progress().pause_flags().power_up);
        assert_eq!(run.choose_power_up(offer[0]), Err(PowerUpError::NoPendingOffer));
        assert_eq!(
            run.choose_power_up_key("warp_drive"),
            Err(PowerUpError::UnknownKey("warp_drive".into()))
        );
    }

    #[test]
    fn test_power_up_effects() {
        let mut run = run_with(SaveData::default(), open_water());
        run.offer = Some(PowerUp::ALL.to_vec());
        run.choose_power_up(PowerUp::HullReinforce).unwrap();
        assert_eq!(run.player().hull, 2);

        run.offer = Some(PowerUp::ALL.to_vec());
        run.choose_power_up(PowerUp::ExtraTorpedo).unwrap();
        assert_eq!(run.torpedoes().remaining(TorpedoKind::Light), 4);

        run.offer = Some(PowerUp::ALL.to_vec());
        run.choose_power_up(PowerUp::SonarBoost).unwrap();
        assert_eq!(run.sonar().range(), 600.0);

        run.offer = Some(PowerUp::ALL.to_vec());
        run.choose_power_up(PowerUp::TempShield).unwrap();
        assert!(run.player().is_invincible());
    }

    #[test]
    fn test_energy_regenerates_with_bonus() {
        let mut run = run_with(SaveData::default(), open_water());
        run.activate_sonar();
        run.sonar.recharge_bonus = 1.0;
        // Just over one regen interval
        run.update(FrameDelta::from_secs(1.01), &idle());
        assert_eq!(run.sonar().energy(), 97.0);
    }

    #[test]
    fn test_ammo_is_spent_once() {
        let mut run = run_with(SaveData::default(), open_water());
        for _ in 0..3 {
            run.fire(Vec2::new(400.0, 600.0)).unwrap();
        }
        assert_eq!(
            run.fire(Vec2::new(400.0, 600.0)),
            Err(FireError::NoAmmo(TorpedoKind::Light))
        );
        assert_eq!(run.snapshot().ammo[0], (TorpedoKind::Light, 0));
    }

    #[test]
    fn test_teardown_is_idempotent() {
        let mut run = run_with(SaveData::default(), open_water());
        place_enemy(&mut run, Vec2::new(100.0, 400.0));
        run.activate_sonar();
        run.fire(Vec2::new(400.0, 600.0)).unwrap();
        run.teardown();
        run.teardown();
        assert!(run.enemies().is_empty());
        assert!(!run.sonar().is_active());
        assert!(run.torpedoes().in_flight().is_empty());
    }
}
