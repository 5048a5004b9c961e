//! Sprite batching stress demo.
//!
//! Draws 100,000 independently animated sprites from two sheets in one
//! batch (two atlases, so two draw calls), plus an FPS readout rendered
//! through the MSDF font path. Escape quits.
//!
//! Expects an asset directory laid out as:
//!   assets/entity/transport-belt/transport-belt.png  (16x20 grid)
//!   assets/entity/worm/worm-attack.png               (4x4 grid)
//!   assets/fonts/font.json + assets/fonts/font.png
//!
//! Pass a different asset root as the first argument.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Mat4;
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use spriteflow::{
    AnimationState, AtlasId, AtlasRegistry, BatchKind, FrameSequence, MsdfFont,
    SpriteBatcher, SpriteInstance, SpriteRenderer,
};

const SPRITE_COUNT: usize = 100_000;
const GRID_COLUMNS: usize = 500;
const SPRITE_SIZE: f32 = 64.0;
const SPRITE_SPACING: f32 = 32.0;

struct Scene {
    belt: AtlasId,
    worm: AtlasId,
    belt_run: FrameSequence,
    worm_attack: FrameSequence,
    clocks: Vec<AnimationState>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let asset_root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));

    tracing::info!("Starting sprite stress demo ({} sprites)", SPRITE_COUNT);

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Spriteflow Stress")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .build(&event_loop)
            .expect("Failed to create window"),
    );

    let mut renderer = pollster::block_on(SpriteRenderer::new(window.clone()));
    let mut atlases = AtlasRegistry::new();

    let belt = match atlases.load_sheet(
        &renderer,
        &asset_root.join("entity/transport-belt/transport-belt.png"),
        16,
        20,
        false,
    ) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to load belt sheet: {e}");
            return;
        }
    };
    let worm = match atlases.load_sheet(
        &renderer,
        &asset_root.join("entity/worm/worm-attack.png"),
        4,
        4,
        false,
    ) {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to load worm sheet: {e}");
            return;
        }
    };

    let font = match MsdfFont::load(
        &renderer,
        &mut atlases,
        &asset_root.join("fonts/font.json"),
        &asset_root.join("fonts/font.png"),
    ) {
        Ok(font) => font,
        Err(e) => {
            tracing::error!("Failed to load font: {e}");
            return;
        }
    };

    let mut scene = Scene {
        belt,
        worm,
        belt_run: FrameSequence::new((0..16).collect(), 0.05),
        worm_attack: FrameSequence::new((0..16).collect(), 0.05),
        clocks: vec![AnimationState::new(); SPRITE_COUNT],
    };

    let mut batcher = SpriteBatcher::new();
    let mut text_batcher = SpriteBatcher::new();
    let mut last_frame = Instant::now();
    let mut fps_text = String::from("FPS: --");
    let mut last_title_update = Instant::now();

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),

                WindowEvent::Resized(size) => {
                    renderer.resize(size.width, size.height);
                }

                WindowEvent::KeyboardInput { event, .. } => {
                    if event.state == ElementState::Pressed
                        && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                    {
                        elwt.exit();
                    }
                }

                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;

                    let frame = match renderer.begin_frame() {
                        Ok(frame) => frame,
                        Err(wgpu::SurfaceError::Lost) => {
                            let (w, h) = renderer.size();
                            renderer.resize(w, h);
                            return;
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            tracing::error!("Out of GPU memory!");
                            elwt.exit();
                            return;
                        }
                        Err(e) => {
                            tracing::warn!("Surface error: {:?}", e);
                            return;
                        }
                    };
                    renderer.clear(
                        &frame,
                        wgpu::Color {
                            r: 0.08,
                            g: 0.08,
                            b: 0.10,
                            a: 1.0,
                        },
                    );

                    let (w, h) = renderer.size();
                    let projection =
                        Mat4::orthographic_rh(0.0, w as f32, h as f32, 0.0, -1.0, 1.0);

                    // Sprite pass: every sprite advances its own clock
                    batcher.begin(projection, BatchKind::Sprite);
                    for i in 0..SPRITE_COUNT {
                        let x = (i % GRID_COLUMNS) as f32 * SPRITE_SPACING;
                        let y = (i / GRID_COLUMNS) as f32 * SPRITE_SPACING;

                        let (atlas, sequence) = if i & 1 == 0 {
                            (scene.belt, &scene.belt_run)
                        } else {
                            (scene.worm, &scene.worm_attack)
                        };
                        scene.clocks[i].advance(dt, sequence);
                        let tile = scene.clocks[i].current_tile(sequence);

                        let uv = match atlases.get(atlas) {
                            Some(sheet) => sheet.tile_rect(tile),
                            None => continue,
                        };
                        batcher.submit(
                            Some(atlas),
                            SpriteInstance::new([x, y], [SPRITE_SIZE, SPRITE_SIZE], uv),
                        );
                    }
                    renderer.end_batch(&mut batcher, &atlases, &frame);

                    // Font pass
                    if last_title_update.elapsed().as_secs_f32() >= 0.25 {
                        fps_text = format!("FPS: {:.0}", renderer.metrics().fps());
                        last_title_update = Instant::now();
                    }
                    text_batcher.begin(projection, BatchKind::Font);
                    font.draw_text(&mut text_batcher, &fps_text, 10.0, 10.0, 1.0);
                    renderer.end_batch(&mut text_batcher, &atlases, &frame);

                    renderer.present(frame);
                }

                _ => {}
            },

            Event::AboutToWait => {
                window.request_redraw();
            }

            _ => {}
        })
        .expect("Event loop error");
}
