use std::collections::HashMap;

use glam::Vec2;
use image::{Rgba, RgbaImage};

use jkit::animation::{AnimationClip, AnimationEvent, AnimationSet, Animator, EffectKind, EffectTracker, PlayMode};
use jkit::app::{Context, Game};
use jkit::arena::Handle;
use jkit::audio::SoundConfig;
use jkit::collision::{self, Collider, CollisionEvent, CollisionWorld, STATIC_LAYER};
use jkit::config::KitConfig;
use jkit::input::KeyCode;
use jkit::physics::{PhysicsWorld, RigidBody};
use jkit::serialization::{EntityState, SaveState};
use jkit::sprite::{Color, Sprite, SpriteSheet, TextureId};
use jkit::tilemap::{TileId, TileMap, Tileset};

const SAVE_PATH: &str = "jkit_save.yaml";

const TILE: u32 = 32;
const FRAME: u32 = 16;

const PLAYER_LAYER: u32 = 1 << 0;
const COIN_LAYER: u32 = 1 << 1;

const RUN_SPEED: f32 = 220.0;
const JUMP_SPEED: f32 = 460.0;

const LEVEL: [&str; 12] = [
    "#......................................#",
    "#......................................#",
    "#..............C.C.C...................#",
    "#.............BBBBBBB.........C........#",
    "#.....C...............................C#",
    "#....BBB..................BBBB....BBBBB#",
    "#.P....................................#",
    "#~~~~~......~~~~~~~.........~~~~~......#",
    "##########....####...###################",
    "##########....####...###################",
    "##########....####...###################",
    "########################################",
];

// ── Procedural assets ───────────────────────────────────────────────────────

/// Three 16×16 tiles: ground, brick, grass tuft.
fn tileset_image() -> RgbaImage {
    RgbaImage::from_fn(FRAME * 3, FRAME, |x, y| {
        let (tile, lx, ly) = (x / FRAME, x % FRAME, y);
        match tile {
            0 if ly < 3 => Rgba([70, 170, 60, 255]),
            0 => Rgba([120 + ((lx * 7 + ly * 3) % 20) as u8, 80, 45, 255]),
            1 if ly % 8 == 0 || (lx + if ly / 8 == 0 { 0 } else { 8 }) % FRAME == 0 => Rgba([60, 40, 35, 255]),
            1 => Rgba([170, 75, 55, 255]),
            _ if ly > 10 && (lx % 4 == 1 || lx % 4 == 2) => Rgba([90, 200, 80, 255]),
            _ => Rgba([0, 0, 0, 0]),
        }
    })
}

/// Four 16×16 frames: a block body with legs swinging.
fn player_image() -> RgbaImage {
    RgbaImage::from_fn(FRAME * 4, FRAME, |x, y| {
        let (frame, lx) = (x / FRAME, x % FRAME);
        let leg_shift = [0, 2, 0, -2][frame as usize];
        if (3..13).contains(&lx) && (1..11).contains(&y) {
            if y == 4 && (lx == 6 || lx == 10) {
                Rgba([20, 20, 30, 255])
            } else {
                Rgba([80, 140, 230, 255])
            }
        } else if y >= 11 {
            let left = 5 + leg_shift;
            let right = 10 - leg_shift;
            if lx as i32 == left || lx as i32 == right {
                Rgba([40, 60, 120, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn coin_image() -> RgbaImage {
    RgbaImage::from_fn(FRAME, FRAME, |x, y| {
        let d = Vec2::new(x as f32 - 7.5, y as f32 - 7.5).length();
        if d < 5.0 {
            Rgba([250, 210, 60, 255])
        } else if d < 6.5 {
            Rgba([200, 150, 30, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// Mono 16-bit PCM square-wave blip as a complete WAV file.
fn blip_wav(freq: f32, secs: f32) -> Vec<u8> {
    const RATE: u32 = 22050;
    let samples = (RATE as f32 * secs) as u32;
    let data_len = samples * 2;

    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&RATE.to_le_bytes());
    out.extend_from_slice(&(RATE * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    for i in 0..samples {
        let t = i as f32 / RATE as f32;
        let envelope = 1.0 - i as f32 / samples as f32;
        let square = if (t * freq).fract() < 0.5 { 1.0 } else { -1.0 };
        let v = (square * envelope * 0.3 * i16::MAX as f32) as i16;
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn legend() -> HashMap<char, TileId> {
    HashMap::from([('#', 0), ('B', 1), ('~', 2)])
}

// ── Level state ─────────────────────────────────────────────────────────────

struct Coin {
    collider: Handle,
    position: Vec2,
}

struct Level {
    map: TileMap,
    tileset: Tileset,
    physics: PhysicsWorld,
    collisions: CollisionWorld,
    static_colliders: Vec<Handle>,

    player_body: Handle,
    player_collider: Handle,
    player_sprite: Sprite,
    player_sheet: SpriteSheet,
    animator: Animator,
    spawn: Vec2,
    grounded: bool,

    coin_texture: TextureId,
    coins: Vec<Coin>,
    collected: u32,

    effects: EffectTracker<&'static str>,
}

impl Level {
    fn build(ctx: &mut Context) -> jkit::Result<Self> {
        let tiles_id = ctx.textures.insert_image("demo/tiles", tileset_image());
        let player_id = ctx.textures.insert_image("demo/player", player_image());
        let coin_texture = ctx.textures.insert_image("demo/coin", coin_image());

        let tileset = Tileset::new(SpriteSheet::from_grid(tiles_id, FRAME * 3, FRAME, FRAME, FRAME, 0, 0)?)
            .with_solid(0, "ground")
            .with_solid(1, "brick");
        let player_sheet = SpriteSheet::from_grid(player_id, FRAME * 4, FRAME, FRAME, FRAME, 0, 0)?;

        let mut clips = AnimationSet::new();
        clips.insert(AnimationClip::uniform("idle", &[0], 1.0, PlayMode::Loop)?);
        clips.insert(AnimationClip::uniform("run", &[0, 1, 2, 3], 10.0, PlayMode::Loop)?);
        clips.insert(AnimationClip::uniform("jump", &[1], 1.0, PlayMode::Once)?);
        let mut animator = Animator::new(clips);
        animator.set_state("idle")?;

        let map = TileMap::from_rows(&LEVEL, &legend(), TILE, TILE)?;
        let spawn = TileMap::find_markers(&LEVEL, 'P')
            .first()
            .map_or(Vec2::splat(TILE as f32 * 2.0), |&(x, y)| map.tile_center(x, y));

        let mut physics = PhysicsWorld::new(&ctx.config.physics);
        let mut collisions = CollisionWorld::new(&ctx.config.collision);
        let static_colliders = collisions.add_static_rects(&map.solid_colliders(&tileset));

        let player_body = physics.add_body(
            RigidBody::dynamic(spawn, 1.0)
                .with_friction(0.0)
                .with_max_speed(900.0),
        );
        let player_collider = collisions.insert(
            Collider::aabb(spawn, Vec2::new(11.0, 14.0))
                .with_layer(PLAYER_LAYER, STATIC_LAYER | COIN_LAYER)
                .attached(player_body),
        );

        let mut player_sprite = Sprite::new(player_id).with_position(spawn).with_layer(10);
        player_sprite.scale = Vec2::splat(TILE as f32 / FRAME as f32);
        animator.apply(&mut player_sprite, &player_sheet);

        let mut level = Self {
            map,
            tileset,
            physics,
            collisions,
            static_colliders,
            player_body,
            player_collider,
            player_sprite,
            player_sheet,
            animator,
            spawn,
            grounded: false,
            coin_texture,
            coins: Vec::new(),
            collected: 0,
            effects: EffectTracker::new(),
        };
        let coin_positions: Vec<Vec2> = TileMap::find_markers(&LEVEL, 'C')
            .into_iter()
            .map(|(x, y)| level.map.tile_center(x, y))
            .collect();
        level.spawn_coins(&coin_positions);
        log::info!(
            "demo: level {}x{} tiles, {} static colliders, {} coins",
            level.map.width(),
            level.map.height(),
            level.static_colliders.len(),
            level.coins.len()
        );
        Ok(level)
    }

    fn spawn_coins(&mut self, positions: &[Vec2]) {
        for coin in self.coins.drain(..) {
            self.collisions.remove(coin.collider);
        }
        for (i, &position) in positions.iter().enumerate() {
            let collider = self.collisions.insert(
                Collider::circle(position, 8.0)
                    .trigger()
                    .with_layer(COIN_LAYER, PLAYER_LAYER)
                    .with_user_data(i as u64),
            );
            self.coins.push(Coin { collider, position });
        }
    }

    fn rebuild_static_colliders(&mut self) {
        for h in self.static_colliders.drain(..) {
            self.collisions.remove(h);
        }
        self.static_colliders = self.collisions.add_static_rects(&self.map.solid_colliders(&self.tileset));
    }

    fn player_position(&self) -> Vec2 {
        self.physics.body(self.player_body).map_or(self.spawn, |b| b.position)
    }

    // ── Fixed step ──────────────────────────────────────────────────────────

    fn step(&mut self, ctx: &mut Context) {
        let dt = ctx.dt();
        let dir = ctx.input.axis(KeyCode::ArrowLeft, KeyCode::ArrowRight);
        let jump = ctx.is_key_pressed(KeyCode::Space) || ctx.is_key_pressed(KeyCode::ArrowUp);

        if let Some(body) = self.physics.body_mut(self.player_body) {
            body.velocity.x = dir * RUN_SPEED;
            if jump && self.grounded {
                body.velocity.y = -JUMP_SPEED;
            }
        }

        self.physics.integrate(dt);
        self.collisions.sync_from_bodies(&self.physics);
        let events = self.collisions.step().to_vec();
        collision::resolve_contacts(&mut self.physics, &self.collisions);

        self.grounded = self.collisions.contacts().any(|(a, b, c)| {
            (a == self.player_collider && c.normal.y > 0.5) || (b == self.player_collider && c.normal.y < -0.5)
        });

        for event in &events {
            if let CollisionEvent::Enter { .. } = event {
                if let Some(other) = event.other(self.player_collider) {
                    self.collect(ctx, other);
                }
            }
        }

        let position = self.player_position();
        if position.y > self.map.pixel_size().y + TILE as f32 * 4.0 {
            log::info!("demo: fell out of the level, respawning");
            if let Some(body) = self.physics.body_mut(self.player_body) {
                body.position = self.spawn;
                body.velocity = Vec2::ZERO;
            }
        }

        let state = if !self.grounded {
            "jump"
        } else if dir != 0.0 {
            "run"
        } else {
            "idle"
        };
        if let Err(e) = self.animator.set_state(state) {
            log::warn!("demo: {e}");
        }
        if dir != 0.0 {
            self.player_sprite.flip_x = dir < 0.0;
        }
        for event in self.animator.update(dt, &mut self.player_sprite, &self.player_sheet) {
            if event == AnimationEvent::Looped && state == "run" {
                ctx.audio.play("step", SoundConfig::default().with_volume(0.2).with_variation(0.1, 0.05));
            }
        }
        self.effects.tick(dt);
        ctx.camera.follow(self.player_position(), dt);
    }

    fn collect(&mut self, ctx: &mut Context, collider: Handle) {
        let Some(i) = self.coins.iter().position(|c| c.collider == collider) else { return };
        let coin = self.coins.swap_remove(i);
        self.collisions.remove(coin.collider);
        self.collected += 1;
        self.effects.play("player", EffectKind::Shiver { magnitude: 2.0 });
        ctx.play_spatial("coin", coin.position);
        log::info!("demo: coin collected ({} total, {} left)", self.collected, self.coins.len());
    }

    // ── Save / load ─────────────────────────────────────────────────────────

    fn snapshot(&self) -> SaveState {
        let mut state = SaveState::new();
        let body = self.physics.body(self.player_body);
        state.entities.push(EntityState {
            name: "player".into(),
            position: body.map_or(self.spawn, |b| b.position),
            velocity: body.map_or(Vec2::ZERO, |b| b.velocity),
            animation: self.animator.state().map(str::to_string),
        });
        state.entities.extend(self.coins.iter().map(|c| EntityState {
            name: "coin".into(),
            position: c.position,
            velocity: Vec2::ZERO,
            animation: None,
        }));
        state.tilemap = Some(self.map.to_data());
        state
    }

    fn restore(&mut self, state: &SaveState) -> jkit::Result<()> {
        if let Some(data) = &state.tilemap {
            self.map = TileMap::from_data(data)?;
            self.rebuild_static_colliders();
        }
        if let Some(player) = state.entity("player") {
            if let Some(body) = self.physics.body_mut(self.player_body) {
                body.position = player.position;
                body.velocity = player.velocity;
            }
            if let Some(anim) = &player.animation {
                self.animator.set_state(anim)?;
            }
        }
        let coins: Vec<Vec2> = state.entities.iter().filter(|e| e.name == "coin").map(|e| e.position).collect();
        self.spawn_coins(&coins);
        Ok(())
    }

    // ── Drawing ─────────────────────────────────────────────────────────────

    fn draw(&self, ctx: &mut Context) {
        let view = ctx.visible_rect();
        self.map.draw(&mut ctx.batch, &self.tileset, &ctx.textures, view);

        for coin in &self.coins {
            let sprite = Sprite::new(self.coin_texture).with_position(coin.position).with_layer(5);
            ctx.batch.draw(&sprite, &ctx.textures);
        }

        let mut player = self.player_sprite.clone();
        player.position = self.player_position() + self.effects.offset("player");
        if self.effects.is_active("player") {
            player.tint = Color::YELLOW;
        }
        ctx.batch.draw(&player, &ctx.textures);
    }
}

// ── Game ────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Demo {
    level: Option<Level>,
}

impl Game for Demo {
    fn on_enter(&mut self, ctx: &mut Context) {
        for (name, freq, secs) in [("coin", 1320.0, 0.12), ("step", 180.0, 0.04)] {
            if let Err(e) = ctx.audio.load_sound_from_bytes(name, blip_wav(freq, secs)) {
                log::warn!("demo: {e}");
            }
        }
        ctx.camera.follow_speed = 8.0;
        ctx.camera.set_zoom(1.5);

        match Level::build(ctx) {
            Ok(level) => {
                ctx.camera.position = level.spawn;
                self.level = Some(level);
            }
            Err(e) => {
                log::error!("demo: failed to build level: {e}");
                ctx.request_quit();
            }
        }
    }

    fn update(&mut self, ctx: &mut Context) {
        if ctx.is_key_pressed(KeyCode::Escape) {
            ctx.request_quit();
            return;
        }
        let Some(level) = self.level.as_mut() else { return };

        if ctx.is_key_pressed(KeyCode::F5) {
            match level.snapshot().save(SAVE_PATH) {
                Ok(()) => log::info!("demo: saved to {SAVE_PATH}"),
                Err(e) => log::error!("demo: save failed: {e}"),
            }
        }
        if ctx.is_key_pressed(KeyCode::F9) {
            match SaveState::load(SAVE_PATH).and_then(|s| level.restore(&s)) {
                Ok(()) => log::info!("demo: loaded {SAVE_PATH}"),
                Err(e) => log::error!("demo: load failed: {e}"),
            }
        }

        level.step(ctx);
    }

    fn render(&mut self, ctx: &mut Context) {
        if let Some(level) = &self.level {
            level.draw(ctx);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => KitConfig::load_or_default(path),
        None => KitConfig::default(),
    };
    config.window.title = "jkit demo".into();
    config.validate();

    if let Err(e) = jkit::app::run(config, Demo::default()) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
