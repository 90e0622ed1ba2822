/// Sprite pipeline tests: cache, sheets, atlas packing and batching.
///
/// Everything here is CPU-side; no window or GPU is needed.
use glam::Vec2;
use image::{Rgba, RgbaImage};
use jkit::Error;
use jkit::geometry::Rect;
use jkit::sprite::{Sprite, SpriteAtlas, SpriteBatch, SpriteSheet, TextureCache, TextureId};

fn solid(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
}

// ── TextureCache ─────────────────────────────────────────────────────────────

#[test]
fn cache_decodes_each_path_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hero.png");
    solid(4, 2).save(&path).unwrap();

    let mut cache = TextureCache::new();
    let a = cache.load(&path).unwrap();
    let b = cache.load(&path).unwrap();
    assert_eq!(a, b);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.stats().misses, 1);
    assert_eq!(cache.stats().hits, 1);
    assert_eq!(cache.size_of(a), Some((4, 2)));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = TextureCache::new();
    let err = cache.load(dir.path().join("nope.png")).unwrap_err();
    assert!(matches!(err, Error::Io { .. }), "expected Io, got {err:?}");
}

#[test]
fn placeholder_stands_in_for_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut cache = TextureCache::new();
    let id = cache.load_or_placeholder(dir.path().join("nope.png"));
    assert_eq!(cache.size_of(id), Some((8, 8)));
}

#[test]
fn unload_bumps_generation_and_forgets_key() {
    let mut cache = TextureCache::new();
    let id = cache.insert_image("tiles", solid(2, 2));
    let before = cache.generation();
    assert!(cache.unload("tiles"));
    assert!(cache.generation() > before);
    assert!(cache.get(id).is_none());
    assert_eq!(cache.id_of("tiles"), None);
    assert!(!cache.unload("tiles"));
}

#[test]
fn reinserting_a_key_replaces_the_texture() {
    let mut cache = TextureCache::new();
    let old = cache.insert_image("tiles", solid(2, 2));
    let new = cache.insert_image("tiles", solid(4, 4));
    assert_ne!(old, new);
    assert!(cache.get(old).is_none());
    assert_eq!(cache.size_of(new), Some((4, 4)));
    assert_eq!(cache.len(), 1);
}

// ── SpriteSheet ──────────────────────────────────────────────────────────────

#[test]
fn sheet_with_margin_and_spacing() {
    // 1px margin, 2px spacing: 1 + 16 + 2 + 16 + 1 = 36 wide → 2 columns.
    let sheet = SpriteSheet::from_grid(TextureId(0), 36, 18, 16, 16, 1, 2).unwrap();
    assert_eq!(sheet.frame_count(), 2);
    assert_eq!(sheet.frame_rect(1), Some(Rect::new(19.0, 1.0, 16.0, 16.0)));
    assert_eq!(sheet.frame_rect(2), None);
}

#[test]
fn sheet_frame_uv_is_normalised() {
    let sheet = SpriteSheet::from_grid(TextureId(0), 64, 16, 16, 16, 0, 0).unwrap();
    let (min, max) = sheet.frame_uv(2).unwrap();
    assert_eq!(min, [0.5, 0.0]);
    assert_eq!(max, [0.75, 1.0]);
}

#[test]
fn sheet_rejects_frames_that_do_not_fit() {
    let err = SpriteSheet::from_grid(TextureId(0), 8, 8, 16, 16, 0, 0).unwrap_err();
    assert!(matches!(err, Error::InvalidSheet(_)));
}

// ── Atlas ────────────────────────────────────────────────────────────────────

#[test]
fn atlas_from_folder_registers_regions_by_stem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("enemies")).unwrap();
    solid(16, 16).save(dir.path().join("hero.png")).unwrap();
    solid(32, 16).save(dir.path().join("enemies").join("slime.png")).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not an image").unwrap();

    let mut cache = TextureCache::new();
    let atlas = SpriteAtlas::from_folder(&mut cache, dir.path(), "atlas").unwrap();
    assert_eq!(atlas.len(), 2);
    assert_eq!(atlas.region("slime").map(|r| (r.w, r.h)), Some((32.0, 16.0)));
    assert!(atlas.region("notes").is_none());
    assert_eq!(cache.id_of("atlas"), Some(atlas.texture));
    assert!(atlas.width.is_power_of_two() && atlas.height.is_power_of_two());
}

#[test]
fn atlas_regions_do_not_overlap() {
    let images = (0..10).map(|i| (format!("s{i}"), solid(100, 20 + i))).collect();
    let mut cache = TextureCache::new();
    let atlas = SpriteAtlas::from_images(&mut cache, "packed", images);
    let regions: Vec<Rect> = atlas.names().filter_map(|n| atlas.region(n)).collect();
    assert_eq!(regions.len(), 10);
    for (i, a) in regions.iter().enumerate() {
        for b in &regions[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }
}

#[test]
fn missing_sprite_folder_is_an_error() {
    let mut cache = TextureCache::new();
    assert!(SpriteAtlas::from_folder(&mut cache, "/definitely/not/here", "atlas").is_err());
}

// ── SpriteBatch ──────────────────────────────────────────────────────────────

fn two_textures() -> (TextureCache, TextureId, TextureId) {
    let mut cache = TextureCache::new();
    let a = cache.insert_image("a", solid(8, 8));
    let b = cache.insert_image("b", solid(8, 8));
    (cache, a, b)
}

#[test]
fn same_texture_sprites_share_one_draw_call() {
    let (cache, a, _) = two_textures();
    let mut batch = SpriteBatch::new();
    batch.begin();
    for i in 0..5 {
        batch.draw(&Sprite::new(a).with_position(Vec2::new(i as f32 * 10.0, 0.0)), &cache);
    }
    batch.finish();
    assert_eq!(batch.vertices().len(), 20);
    assert_eq!(batch.indices().len(), 30);
    assert_eq!(batch.draw_calls().len(), 1);
    assert_eq!(batch.draw_calls()[0].index_range, 0..30);
}

#[test]
fn layers_sort_before_submission_order() {
    let (cache, a, b) = two_textures();
    let mut batch = SpriteBatch::new();
    batch.begin();
    batch.draw(&Sprite::new(a).with_layer(2), &cache);
    batch.draw(&Sprite::new(b).with_layer(1), &cache);
    batch.draw(&Sprite::new(a).with_layer(1), &cache);
    batch.finish();

    let calls: Vec<TextureId> = batch.draw_calls().iter().map(|c| c.texture).collect();
    // Layer 1 keeps submission order (b, a), then layer 2's a merges with it.
    assert_eq!(calls, vec![b, a]);
    assert_eq!(batch.draw_calls()[1].index_range, 6..18);
}

#[test]
fn alternating_textures_break_batches() {
    let (cache, a, b) = two_textures();
    let mut batch = SpriteBatch::new();
    batch.begin();
    for tex in [a, b, a] {
        batch.draw(&Sprite::new(tex), &cache);
    }
    batch.finish();
    assert_eq!(batch.draw_calls().len(), 3);
}

#[test]
fn invisible_and_unknown_sprites_are_skipped() {
    let (cache, a, _) = two_textures();
    let mut hidden = Sprite::new(a);
    hidden.visible = false;

    let mut batch = SpriteBatch::new();
    batch.begin();
    batch.draw(&hidden, &cache);
    batch.draw(&Sprite::new(TextureId(99)), &cache);
    batch.draw(&Sprite::new(TextureId(99)), &cache);
    assert_eq!(batch.pending(), 0);
    batch.finish();
    assert!(batch.is_empty());
}

#[test]
fn begin_clears_previous_frame() {
    let (cache, a, _) = two_textures();
    let mut batch = SpriteBatch::new();
    batch.begin();
    batch.draw(&Sprite::new(a), &cache);
    batch.finish();
    batch.begin();
    batch.finish();
    assert!(batch.vertices().is_empty());
    assert!(batch.draw_calls().is_empty());
}

#[test]
fn tint_reaches_every_vertex() {
    let (cache, a, _) = two_textures();
    let mut batch = SpriteBatch::new();
    batch.begin();
    batch.draw(&Sprite::new(a).with_tint(jkit::sprite::Color::RED), &cache);
    batch.finish();
    assert!(batch.vertices().iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
}
