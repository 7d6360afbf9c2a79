//! One frame of scene draws, in a fixed order.

use glam::{Mat4, Vec3};
use vista_assets::InterleavedMesh;
use vista_scene::{MeshHandle, SceneState, TimeOfDay};

use crate::driver::{
    BlendMode, DepthState, GpuDriver, GpuError, TextureHandle, VertexLayout,
};
use crate::palette::{self, STAR_TINT};
use crate::uniforms::{Uniform, UniformTable};

struct TerrainDraw {
    mesh: MeshHandle,
    world: Mat4,
}

/// Per-draw inputs beyond geometry.
struct DrawParams {
    transform: Mat4,
    world: Mat4,
    tint: Vec3,
    alpha: f32,
    use_texture: bool,
    is_light: bool,
}

impl DrawParams {
    fn model(transform: Mat4, tint: Vec3) -> Self {
        Self {
            transform,
            world: Mat4::IDENTITY,
            tint,
            alpha: 1.0,
            use_texture: false,
            is_light: false,
        }
    }
}

/// Turns [`SceneState`] into draw calls. Never writes simulation state.
pub struct SceneRenderer {
    uniforms: UniformTable,
    layout: Result<VertexLayout, GpuError>,
    aspect: f32,
    terrain: Option<TerrainDraw>,
    terrain_texture: Option<TextureHandle>,
}

impl SceneRenderer {
    /// Resolves shader inputs once. A missing required uniform is fatal; a
    /// missing vertex attribute only disables buffer binding.
    pub fn new<D: GpuDriver + ?Sized>(driver: &D) -> Result<Self, GpuError> {
        let uniforms = UniformTable::resolve(driver)?;
        let layout = VertexLayout::resolve(driver);
        if let Err(e) = &layout {
            log::error!("Vertex layout unavailable: {e}");
        }
        Ok(Self {
            uniforms,
            layout,
            aspect: 1.0,
            terrain: None,
            terrain_texture: None,
        })
    }

    /// Upload the terrain buffer and place it so its footprint is centered on
    /// the origin and its base sits `height` below it.
    pub fn upload_terrain<D: GpuDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        mesh: &InterleavedMesh,
        width: f32,
        height: f32,
        depth: f32,
    ) -> Result<MeshHandle, GpuError> {
        self.layout.clone()?;
        let buffer = driver.create_vertex_buffer("terrain", mesh)?;
        let handle = MeshHandle {
            buffer,
            vertex_count: mesh.vertex_count() as u32,
        };
        self.terrain = Some(TerrainDraw {
            mesh: handle,
            world: Mat4::from_translation(Vec3::new(-width / 2.0, -height, -depth / 2.0)),
        });
        Ok(handle)
    }

    pub fn set_terrain_texture(&mut self, texture: TextureHandle) {
        self.terrain_texture = Some(texture);
    }

    pub fn set_viewport<D: GpuDriver + ?Sized>(&mut self, driver: &mut D, width: u32, height: u32) {
        driver.set_viewport(width, height);
        self.aspect = if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        };
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn render<D: GpuDriver + ?Sized>(
        &self,
        driver: &mut D,
        scene: &SceneState,
    ) -> Result<(), GpuError> {
        let time_of_day = scene.time_of_day;
        let sky = palette::sky_color(time_of_day);
        let tints = palette::tints(time_of_day);
        driver.begin_frame(sky)?;

        let u = &self.uniforms;
        u.set(driver, Uniform::Camera, scene.camera.view_matrix());
        u.set(driver, Uniform::Projection, scene.camera.projection_matrix(self.aspect));
        u.set(driver, Uniform::ViewPos, scene.camera.position());
        u.set(driver, Uniform::Time, scene.elapsed_secs());
        u.set(driver, Uniform::LightingMode, scene.lighting_mode.as_uniform());
        if let Some(light) = scene.celestial.light_position(time_of_day) {
            u.set(driver, Uniform::LightPos, light);
        }

        driver.set_depth(DepthState::OPAQUE);
        driver.set_blend(BlendMode::Opaque);

        if let Some(terrain) = &self.terrain {
            driver.bind_texture(self.terrain_texture);
            let params = DrawParams {
                world: terrain.world,
                use_texture: true,
                ..DrawParams::model(Mat4::IDENTITY, tints.terrain)
            };
            self.draw(driver, terrain.mesh, &params);
        }

        if time_of_day != TimeOfDay::Night
            && let Some(sun) = scene.celestial.sun()
        {
            let params = DrawParams::model(sun.transform, tints.sun);
            self.draw(driver, sun.mesh, &params);
        }

        if time_of_day == TimeOfDay::Night
            && let Some(moon) = scene.celestial.moon()
        {
            let params = DrawParams::model(moon.transform, tints.moon);
            self.draw(driver, moon.mesh, &params);
        }

        if time_of_day != TimeOfDay::Night
            && let Some(clouds) = &scene.clouds
        {
            driver.set_blend(BlendMode::Alpha);
            driver.set_depth(DepthState::READ_ONLY);
            let tint = palette::cloud_tint(sky);
            for cloud in clouds.instances(scene.elapsed_secs(), scene.wind) {
                let params = DrawParams {
                    alpha: cloud.alpha,
                    ..DrawParams::model(cloud.transform, tint)
                };
                self.draw(driver, clouds.template(), &params);
            }
        }

        if time_of_day == TimeOfDay::Night
            && let Some(stars) = &scene.stars
        {
            driver.set_blend(BlendMode::Alpha);
            driver.set_depth(DepthState::DISABLED);
            for star in stars.instances(scene.frame().elapsed_ms) {
                let params = DrawParams {
                    alpha: star.alpha,
                    ..DrawParams::model(star.transform, STAR_TINT)
                };
                self.draw(driver, stars.template(), &params);
            }
        }

        driver.set_depth(DepthState::OPAQUE);
        driver.set_blend(BlendMode::Opaque);
        driver.end_frame()
    }

    /// Bind, upload per-draw uniforms, draw. A buffer that cannot be bound
    /// skips only this draw.
    fn draw<D: GpuDriver + ?Sized>(&self, driver: &mut D, mesh: MeshHandle, params: &DrawParams) {
        let Ok(layout) = &self.layout else {
            return;
        };
        if let Err(e) = driver.bind_vertex_buffer(mesh.buffer, layout) {
            log::warn!("Skipping draw: {e}");
            return;
        }
        let u = &self.uniforms;
        u.set(driver, Uniform::Model, params.transform);
        u.set(driver, Uniform::World, params.world);
        u.set(driver, Uniform::Tint, params.tint);
        u.set(driver, Uniform::Alpha, params.alpha);
        u.set(driver, Uniform::UseTexture, flag(params.use_texture));
        u.set(driver, Uniform::IsLight, flag(params.is_light));
        driver.draw_triangles(mesh.vertex_count);
    }
}

fn flag(on: bool) -> f32 {
    if on { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::UV_ATTRIBUTE;
    use crate::recording::{DriverCall, RecordingDriver};
    use vista_assets::Vertex;
    use vista_scene::{
        CameraIntents, FrameClock, LightingMode, SceneEvent, SceneModels, SceneSettings,
    };

    fn triangle() -> InterleavedMesh {
        InterleavedMesh::from_parts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]], None)
    }

    struct Fixture {
        driver: RecordingDriver,
        renderer: SceneRenderer,
        scene: SceneState,
        terrain: MeshHandle,
        models: SceneModels,
    }

    fn upload(driver: &mut RecordingDriver, label: &str, vertices: usize) -> MeshHandle {
        let mesh = InterleavedMesh::new(vec![Vertex::default(); vertices]);
        let buffer = driver.create_vertex_buffer(label, &mesh).unwrap();
        MeshHandle {
            buffer,
            vertex_count: vertices as u32,
        }
    }

    fn fixture(loaded: bool) -> Fixture {
        let mut driver = RecordingDriver::new();
        let mut renderer = SceneRenderer::new(&driver).unwrap();
        let terrain = renderer
            .upload_terrain(&mut driver, &triangle(), 300.0, 8.0, 300.0)
            .unwrap();
        let models = SceneModels {
            sun: upload(&mut driver, "sun", 36),
            moon: upload(&mut driver, "moon", 48),
            star: upload(&mut driver, "star", 12),
        };
        let mut scene = SceneState::new(SceneSettings {
            cloud_count: 4,
            star_count: 5,
            ..Default::default()
        });
        if loaded {
            scene.attach_models(models);
        }
        scene.update(FrameClock::new().advance(16.0), CameraIntents::default());
        driver.clear_recording();
        Fixture {
            driver,
            renderer,
            scene,
            terrain,
            models,
        }
    }

    impl Fixture {
        fn frame(&mut self) {
            self.driver.clear_recording();
            self.renderer.render(&mut self.driver, &self.scene).unwrap();
        }

        fn set(&mut self, time_of_day: TimeOfDay) {
            self.scene.apply_event(SceneEvent::SetTimeOfDay(time_of_day));
        }

        fn count(&self, mesh: MeshHandle) -> usize {
            self.driver.draws_of(mesh.buffer).count()
        }
    }

    #[test]
    fn test_day_draw_order() {
        let mut f = fixture(true);
        f.frame();
        let order: Vec<_> = f.driver.draws.iter().map(|d| d.buffer).collect();
        // terrain, sun, then 4 clouds on the sun template
        assert_eq!(order[0], f.terrain.buffer);
        assert_eq!(order[1], f.models.sun.buffer);
        assert_eq!(order.len(), 6, "terrain + sun + 4 clouds: {order:?}");
        assert!(order[2..].iter().all(|b| *b == f.models.sun.buffer));
        assert_eq!(f.count(f.models.moon), 0, "moon hidden by day");
        assert_eq!(f.count(f.models.star), 0, "stars hidden by day");
        assert!(f.driver.draws.iter().all(|d| d.in_frame));
    }

    #[test]
    fn test_night_draw_order() {
        let mut f = fixture(true);
        f.set(TimeOfDay::Night);
        f.frame();
        let order: Vec<_> = f.driver.draws.iter().map(|d| d.buffer).collect();
        assert_eq!(order[0], f.terrain.buffer);
        assert_eq!(order[1], f.models.moon.buffer);
        assert_eq!(f.count(f.models.sun), 0, "no sun or clouds at night");
        assert_eq!(f.count(f.models.star), 5);
        assert!(order[2..].iter().all(|b| *b == f.models.star.buffer));
    }

    #[test]
    fn test_clouds_and_stars_follow_time_of_day() {
        let mut f = fixture(true);
        for tod in [
            TimeOfDay::Day,
            TimeOfDay::Night,
            TimeOfDay::Sunset,
            TimeOfDay::Night,
            TimeOfDay::Day,
        ] {
            f.set(tod);
            f.frame();
            let night = tod == TimeOfDay::Night;
            let clouds = f
                .driver
                .draws_of(f.models.sun.buffer)
                .filter(|d| d.blend == BlendMode::Alpha)
                .count();
            assert_eq!(clouds > 0, !night, "cloud draws at {tod:?}");
            assert_eq!(f.count(f.models.star) > 0, night, "star draws at {tod:?}");
        }
    }

    #[test]
    fn test_switch_to_night_applies_next_frame() {
        let mut f = fixture(true);
        f.frame();
        assert_eq!(f.driver.clear_colors(), vec![palette::sky_color(TimeOfDay::Day)]);

        f.set(TimeOfDay::Night);
        f.frame();
        assert_eq!(
            f.driver.clear_colors(),
            vec![palette::sky_color(TimeOfDay::Night)]
        );
        assert_eq!(f.count(f.models.sun), 0, "clouds suppressed immediately");
    }

    #[test]
    fn test_frame_starts_with_clear_and_ends_once() {
        let mut f = fixture(false);
        f.frame();
        let calls = &f.driver.calls;
        assert!(matches!(calls.first(), Some(DriverCall::BeginFrame(_))));
        assert_eq!(calls.last(), Some(&DriverCall::EndFrame));
        let ends = calls.iter().filter(|c| **c == DriverCall::EndFrame).count();
        assert_eq!(ends, 1);
    }

    #[test]
    fn test_unloaded_models_draw_terrain_only() {
        let mut f = fixture(false);
        f.frame();
        assert_eq!(f.driver.draws.len(), 1);
        assert_eq!(f.driver.draws[0].buffer, f.terrain.buffer);

        f.set(TimeOfDay::Night);
        f.frame();
        assert_eq!(f.driver.draws.len(), 1, "no moon or stars before load");
    }

    #[test]
    fn test_terrain_uniforms() {
        let mut f = fixture(false);
        f.set(TimeOfDay::Night);
        f.frame();
        let terrain = &f.driver.draws[0];
        assert_eq!(terrain.mat4(Uniform::Model), Some(Mat4::IDENTITY));
        assert_eq!(
            terrain.mat4(Uniform::World),
            Some(Mat4::from_translation(Vec3::new(-150.0, -8.0, -150.0)))
        );
        assert_eq!(terrain.float(Uniform::UseTexture), Some(1.0));
        assert_eq!(terrain.float(Uniform::IsLight), Some(0.0));
        assert_eq!(
            terrain.vec3(Uniform::Tint),
            Some(palette::tints(TimeOfDay::Night).terrain)
        );
        assert_eq!(terrain.depth, DepthState::OPAQUE);
        assert_eq!(terrain.blend, BlendMode::Opaque);
        assert_eq!(terrain.texture, None, "white fallback before texture load");
    }

    #[test]
    fn test_terrain_texture_binding() {
        let mut f = fixture(false);
        let texture = f
            .driver
            .create_texture("grass", &vista_assets::DecodedTexture::white())
            .unwrap();
        f.renderer.set_terrain_texture(texture);
        f.frame();
        assert_eq!(f.driver.draws[0].texture, Some(texture));
    }

    #[test]
    fn test_sun_is_lit_with_identity_world() {
        let mut f = fixture(true);
        f.frame();
        let sun = &f.driver.draws[1];
        assert_eq!(sun.float(Uniform::IsLight), Some(0.0));
        assert_eq!(sun.float(Uniform::UseTexture), Some(0.0));
        assert_eq!(sun.mat4(Uniform::World), Some(Mat4::IDENTITY));
        assert_eq!(sun.vec3(Uniform::Tint), Some(palette::tints(TimeOfDay::Day).sun));
        assert_eq!(
            sun.mat4(Uniform::Model),
            f.scene.celestial.sun().map(|m| m.transform)
        );
    }

    #[test]
    fn test_sky_bodies_receive_scene_lighting() {
        let mut f = fixture(true);
        f.frame();
        let day: Vec<_> = f.driver.draws.iter().skip(1).collect();
        assert!(!day.is_empty());
        for draw in day {
            assert_eq!(draw.float(Uniform::IsLight), Some(0.0), "day draw {:?}", draw.buffer);
        }

        f.set(TimeOfDay::Night);
        f.frame();
        let moon = f.models.moon.buffer;
        let star = f.models.star.buffer;
        assert_eq!(f.driver.draws_of(moon).count(), 1);
        assert_eq!(f.driver.draws_of(star).count(), 5);
        for draw in f.driver.draws_of(moon).chain(f.driver.draws_of(star)) {
            assert_eq!(draw.float(Uniform::IsLight), Some(0.0), "night draw {:?}", draw.buffer);
        }
    }

    #[test]
    fn test_cloud_state() {
        let mut f = fixture(true);
        f.frame();
        let sky = palette::sky_color(TimeOfDay::Day);
        for cloud in &f.driver.draws[2..] {
            assert_eq!(cloud.blend, BlendMode::Alpha);
            assert_eq!(cloud.depth, DepthState::READ_ONLY, "depth test on, write off");
            assert_eq!(cloud.vec3(Uniform::Tint), Some(palette::cloud_tint(sky)));
            let alpha = cloud.float(Uniform::Alpha).unwrap();
            assert!((0.15..=0.95).contains(&alpha), "cloud alpha {alpha}");
        }
    }

    #[test]
    fn test_star_state() {
        let mut f = fixture(true);
        f.set(TimeOfDay::Night);
        f.frame();
        for star in f.driver.draws_of(f.models.star.buffer) {
            assert_eq!(star.depth, DepthState::DISABLED);
            assert_eq!(star.blend, BlendMode::Alpha);
            assert_eq!(star.vec3(Uniform::Tint), Some(STAR_TINT));
        }
    }

    #[test]
    fn test_state_restored_after_frame() {
        let mut f = fixture(true);
        f.set(TimeOfDay::Night);
        f.frame();
        let tail: Vec<_> = f.driver.calls.iter().rev().take(3).cloned().collect();
        assert_eq!(
            tail,
            vec![
                DriverCall::EndFrame,
                DriverCall::SetBlend(BlendMode::Opaque),
                DriverCall::SetDepth(DepthState::OPAQUE),
            ]
        );
    }

    #[test]
    fn test_shared_uniforms_follow_scene() {
        let mut f = fixture(true);
        f.scene.apply_event(SceneEvent::ToggleLighting);
        f.frame();
        let draw = &f.driver.draws[0];
        assert_eq!(draw.float(Uniform::LightingMode), Some(1.0));
        assert_eq!(draw.vec3(Uniform::ViewPos), Some(f.scene.camera.position()));
        assert_eq!(draw.mat4(Uniform::Camera), Some(f.scene.camera.view_matrix()));
        assert_eq!(
            draw.vec3(Uniform::LightPos),
            Some(f.scene.celestial.sun_position())
        );
        assert_eq!(f.scene.lighting_mode, LightingMode::Toon);
    }

    #[test]
    fn test_no_light_before_bodies_load() {
        let mut f = fixture(false);
        f.frame();
        assert_eq!(f.driver.draws[0].vec3(Uniform::LightPos), None);
    }

    #[test]
    fn test_viewport_sets_aspect() {
        let mut f = fixture(false);
        f.renderer.set_viewport(&mut f.driver, 1600, 800);
        assert_eq!(f.renderer.aspect(), 2.0);
        assert!(f.driver.calls.contains(&DriverCall::SetViewport(1600, 800)));
        f.frame();
        assert_eq!(
            f.driver.draws[0].mat4(Uniform::Projection),
            Some(f.scene.camera.projection_matrix(2.0))
        );
    }

    #[test]
    fn test_missing_attribute_blocks_terrain_upload_only() {
        let mut driver = RecordingDriver::new().without_attribute(UV_ATTRIBUTE);
        let mut renderer = SceneRenderer::new(&driver).expect("uniforms still resolve");
        let result = renderer.upload_terrain(&mut driver, &triangle(), 1.0, 1.0, 1.0);
        assert_eq!(result, Err(GpuError::MissingAttribute("a_UV".to_string())));

        let scene = SceneState::new(SceneSettings::default());
        renderer.render(&mut driver, &scene).unwrap();
        assert!(driver.draws.is_empty());
    }

    #[test]
    fn test_surface_failure_skips_frame() {
        let mut f = fixture(true);
        f.driver.clear_recording();
        f.driver.fail_next_frame = Some(crate::gpu::SurfaceError::Timeout);
        let result = f.renderer.render(&mut f.driver, &f.scene);
        assert!(matches!(result, Err(GpuError::Surface(_))));
        assert!(f.driver.calls.is_empty(), "nothing issued for a skipped frame");
    }
}
