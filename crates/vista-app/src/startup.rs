//! Everything that happens before the first frame, plus the deferred sky
//! assets that arrive afterwards.
//!
//! Terrain is built synchronously and a failure there stops startup. The
//! sun, moon and star models load in the background as one batch; until it
//! resolves the scene draws terrain only. The terrain texture is its own
//! batch so a missing image never holds back the sky.

use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{error, info};
use vista_assets::{
    AssetError, AssetLoader, AssetSource, DecodedTexture, InterleavedMesh, LoadBatch,
    load_obj_positions,
};
use vista_config::{AssetConfig, Config, TerrainConfig};
use vista_render::{GpuDriver, GpuError, RenderContextError, SceneRenderer};
use vista_scene::{MeshHandle, SceneModels, SceneSettings, SceneState};
use vista_terrain::{TerrainGenerator, TerrainMesh, TerrainOptions};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    RenderContext(#[from] RenderContextError),

    #[error("renderer setup failed: {0}")]
    Gpu(#[from] GpuError),

    #[error("terrain mesh unavailable: {0}")]
    Terrain(#[from] AssetError),
}

/// The configured seed, or one taken from the wall clock.
pub fn resolve_seed(configured: Option<u64>) -> u64 {
    configured.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default()
    })
}

pub fn terrain_options(config: &TerrainConfig, seed: u64) -> TerrainOptions {
    TerrainOptions {
        width: config.width,
        height: config.height,
        depth: config.depth,
        seed,
        noise: config.noise,
        roughness: config.roughness,
    }
}

/// Field personalities fall back to the terrain seed so one `--seed`
/// reproduces the whole scene.
pub fn scene_settings(config: &Config, terrain_seed: u64) -> SceneSettings {
    SceneSettings {
        camera: config.camera.clone(),
        celestial: config.sky.celestial.clone(),
        wind: config.sky.wind,
        time_of_day: config.sky.time_of_day,
        lighting_mode: config.sky.lighting_mode,
        cloud_count: config.fields.cloud_count,
        star_count: config.fields.star_count,
        field_seed: config.fields.seed.unwrap_or(terrain_seed),
    }
}

/// Generate the terrain, or read it from `mesh_file` with the positions-only
/// OBJ loader.
pub fn build_terrain(
    config: &TerrainConfig,
    options: &TerrainOptions,
    source: &dyn AssetSource,
) -> Result<TerrainMesh, AssetError> {
    match &config.mesh_file {
        Some(path) => {
            let bytes = source.read(path)?;
            let flat = load_obj_positions(&String::from_utf8_lossy(&bytes));
            let mesh = TerrainMesh::from_flat_positions(&flat, options.width, options.depth);
            info!(path = %path, triangles = mesh.triangle_count(), "loaded terrain mesh");
            Ok(mesh)
        }
        None => Ok(TerrainGenerator.generate(options)),
    }
}

/// Create the terrain vertex buffer.
///
/// A shader without the position or uv attribute only loses the terrain draw;
/// any other failure stops startup.
pub fn upload_terrain<D: GpuDriver + ?Sized>(
    driver: &mut D,
    renderer: &mut SceneRenderer,
    terrain: &TerrainMesh,
    options: &TerrainOptions,
) -> Result<Option<MeshHandle>, GpuError> {
    match renderer.upload_terrain(
        driver,
        &terrain.interleave(),
        options.width,
        options.height,
        options.depth,
    ) {
        Ok(handle) => Ok(Some(handle)),
        Err(GpuError::MissingAttribute(name)) => {
            error!("Shader has no `{name}` attribute, terrain will not draw");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Background loads still outstanding. A batch that fails is logged and
/// dropped; its feature stays off for the session.
pub struct PendingAssets {
    models: Option<LoadBatch<InterleavedMesh>>,
    texture: Option<LoadBatch<DecodedTexture>>,
}

impl PendingAssets {
    pub fn spawn(loader: &AssetLoader, assets: &AssetConfig) -> Self {
        let models = loader.load_models(&[
            assets.sun_model.as_str(),
            assets.moon_model.as_str(),
            assets.star_model.as_str(),
        ]);
        let texture = loader.load_texture(&assets.terrain_texture);
        Self {
            models: Some(models),
            texture: Some(texture),
        }
    }

    /// Nothing left to wait for.
    pub fn is_settled(&self) -> bool {
        self.models.is_none() && self.texture.is_none()
    }

    /// Non-blocking. Uploads whatever has resolved and hands it to the
    /// renderer or the scene.
    pub fn poll<D: GpuDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        renderer: &mut SceneRenderer,
        scene: &mut SceneState,
    ) {
        if let Some(outcome) = self.texture.as_mut().and_then(LoadBatch::poll) {
            self.texture = None;
            match outcome.map(|mut textures| textures.pop()) {
                Ok(Some(texture)) => match driver.create_texture("terrain-texture", &texture) {
                    Ok(handle) => {
                        renderer.set_terrain_texture(handle);
                        info!(width = texture.width, height = texture.height, "terrain texture ready");
                    }
                    Err(e) => error!("Terrain texture upload failed: {e}"),
                },
                Ok(None) => {}
                Err(e) => error!("Terrain texture unavailable, using plain tint: {e}"),
            }
        }

        if let Some(outcome) = self.models.as_mut().and_then(LoadBatch::poll) {
            self.models = None;
            match outcome {
                Ok(meshes) => match upload_models(driver, &meshes) {
                    Ok(models) => scene.attach_models(models),
                    Err(e) => error!("Sky model upload failed, sky bodies disabled: {e}"),
                },
                Err(e) => error!("Sky models unavailable, sun, moon, clouds and stars disabled: {e}"),
            }
        }
    }
}

fn upload_models<D: GpuDriver + ?Sized>(
    driver: &mut D,
    meshes: &[InterleavedMesh],
) -> Result<SceneModels, GpuError> {
    let mut upload = |label: &str, index: usize| -> Result<MeshHandle, GpuError> {
        let mesh = meshes
            .get(index)
            .ok_or_else(|| GpuError::BufferCreation(label.to_string()))?;
        let buffer = driver.create_vertex_buffer(label, mesh)?;
        Ok(MeshHandle {
            buffer,
            vertex_count: mesh.vertex_count() as u32,
        })
    };
    Ok(SceneModels {
        sun: upload("sun", 0)?,
        moon: upload("moon", 1)?,
        star: upload("star", 2)?,
    })
}
