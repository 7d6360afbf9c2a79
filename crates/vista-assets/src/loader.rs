//! Background asset loading.
//!
//! Each request runs on its own named thread and reports back over a channel.
//! A [`LoadBatch`] resolves only when every request in it has arrived, or as
//! soon as any one of them fails. The render loop polls batches once per frame
//! and never blocks on them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::error::AssetError;
use crate::interleave::InterleavedMesh;
use crate::obj::parse_obj;
use crate::texture::{DecodedTexture, decode_texture};

/// Where asset bytes come from.
pub trait AssetSource: Send + Sync + 'static {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError>;
}

/// Reads assets relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsSource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.root.join(path);
        std::fs::read(&full).map_err(|source| AssetError::Io { path: full, source })
    }
}

/// In-memory assets keyed by path. Unknown paths read as `NotFound`.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    files: HashMap<String, Vec<u8>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, path: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), bytes.into());
        self
    }
}

impl AssetSource for MemorySource {
    fn read(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.files.get(path).cloned().ok_or_else(|| AssetError::Io {
            path: PathBuf::from(path),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

/// Results of a set of loads, delivered together in request order.
pub struct LoadBatch<T> {
    labels: Vec<String>,
    receiver: Receiver<(usize, Result<T, AssetError>)>,
    slots: Vec<Option<T>>,
    remaining: usize,
}

impl<T> LoadBatch<T> {
    /// Non-blocking. Returns `None` while loads are outstanding, then the
    /// outcome of the whole batch. A batch resolves once; drop it afterwards.
    pub fn poll(&mut self) -> Option<Result<Vec<T>, AssetError>> {
        while self.remaining > 0 {
            match self.receiver.try_recv() {
                Ok((index, result)) => {
                    if let Err(err) = self.store(index, result) {
                        return Some(Err(err));
                    }
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => return Some(Err(self.gone())),
            }
        }
        Some(Ok(self.take_all()))
    }

    /// Block until the batch resolves.
    pub fn join(mut self) -> Result<Vec<T>, AssetError> {
        while self.remaining > 0 {
            let (index, result) = self.receiver.recv().map_err(|_| self.gone())?;
            self.store(index, result)?;
        }
        Ok(self.take_all())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn store(&mut self, index: usize, result: Result<T, AssetError>) -> Result<(), AssetError> {
        let value = result?;
        if let Some(slot) = self.slots.get_mut(index)
            && slot.replace(value).is_none()
        {
            self.remaining -= 1;
        }
        Ok(())
    }

    fn gone(&self) -> AssetError {
        let missing = self
            .slots
            .iter()
            .zip(&self.labels)
            .find(|(slot, _)| slot.is_none())
            .map(|(_, label)| label.clone())
            .unwrap_or_default();
        AssetError::LoaderGone(missing)
    }

    fn take_all(&mut self) -> Vec<T> {
        self.slots.drain(..).flatten().collect()
    }
}

/// Spawns loads against a shared [`AssetSource`].
#[derive(Clone)]
pub struct AssetLoader {
    source: Arc<dyn AssetSource>,
}

impl AssetLoader {
    pub fn new(source: impl AssetSource) -> Self {
        Self {
            source: Arc::new(source),
        }
    }

    pub fn source(&self) -> &dyn AssetSource {
        self.source.as_ref()
    }

    /// Read and decode each path on its own thread.
    ///
    /// If a thread cannot be spawned the batch is still returned, already
    /// failed, so callers handle every load error in one place.
    pub fn spawn<T, F>(&self, paths: &[&str], decode: F) -> LoadBatch<T>
    where
        T: Send + 'static,
        F: Fn(Vec<u8>) -> Result<T, AssetError> + Send + Sync + 'static,
    {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let decode = Arc::new(decode);

        for (index, path) in paths.iter().enumerate() {
            let label = path.to_string();
            let source = Arc::clone(&self.source);
            let decode = Arc::clone(&decode);
            let tx = sender.clone();

            let spawned = std::thread::Builder::new()
                .name(format!("asset:{label}"))
                .spawn({
                    let label = label.clone();
                    move || {
                        let result = source.read(&label).and_then(|bytes| (*decode)(bytes));
                        match &result {
                            Ok(_) => tracing::debug!(asset = %label, "asset loaded"),
                            Err(err) => tracing::warn!(asset = %label, error = %err, "asset load failed"),
                        }
                        let _ = tx.send((index, result));
                    }
                });

            if let Err(source) = spawned {
                let _ = sender.send((index, Err(AssetError::Spawn { label, source })));
            }
        }

        LoadBatch {
            labels: paths.iter().map(|p| p.to_string()).collect(),
            receiver,
            slots: paths.iter().map(|_| None).collect(),
            remaining: paths.len(),
        }
    }

    /// Load OBJ models as interleaved position + uv meshes.
    pub fn load_models(&self, paths: &[&str]) -> LoadBatch<InterleavedMesh> {
        self.spawn(paths, |bytes| {
            Ok(parse_obj(&String::from_utf8_lossy(&bytes)).interleave())
        })
    }

    pub fn load_texture(&self, path: &str) -> LoadBatch<DecodedTexture> {
        self.spawn(&[path], |bytes| decode_texture(&bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nf 1/1 2/2 3/3\n";
    const QUAD: &str = "v 0 0 0\nv 1 0 0\nv 1 1 0\nv 0 1 0\nf 1 2 3 4\n";

    fn memory_loader() -> AssetLoader {
        AssetLoader::new(
            MemorySource::new()
                .with("tri.obj", TRIANGLE)
                .with("quad.obj", QUAD),
        )
    }

    #[test]
    fn test_join_preserves_request_order() {
        let batch = memory_loader().load_models(&["quad.obj", "tri.obj"]);
        assert_eq!(batch.len(), 2);
        let meshes = batch.join().unwrap();
        assert_eq!(meshes[0].vertex_count(), 6, "quad first");
        assert_eq!(meshes[1].vertex_count(), 3, "triangle second");
    }

    #[test]
    fn test_poll_resolves_without_blocking() {
        let mut batch = memory_loader().load_models(&["tri.obj", "quad.obj", "tri.obj"]);
        let start = std::time::Instant::now();
        let outcome = loop {
            if let Some(outcome) = batch.poll() {
                break outcome;
            }
            assert!(start.elapsed().as_secs() < 5, "batch never resolved");
            std::thread::yield_now();
        };
        let meshes = outcome.unwrap();
        assert_eq!(meshes.len(), 3);
        assert_eq!(meshes[2].vertex_count(), 3);
    }

    #[test]
    fn test_one_failure_fails_the_batch() {
        let batch = memory_loader().load_models(&["tri.obj", "missing.obj"]);
        let err = batch.join().unwrap_err();
        match err {
            AssetError::Io { path, .. } => assert_eq!(path, PathBuf::from("missing.obj")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_batch_resolves_immediately() {
        let mut batch = memory_loader().load_models(&[]);
        assert!(batch.is_empty());
        assert!(matches!(batch.poll(), Some(Ok(ref v)) if v.is_empty()));
    }

    #[test]
    fn test_decoder_panic_reports_loader_gone() {
        let loader = memory_loader();
        let batch = loader.spawn(&["tri.obj"], |_bytes| -> Result<(), AssetError> {
            panic!("decoder exploded")
        });
        let err = batch.join().unwrap_err();
        assert!(
            matches!(err, AssetError::LoaderGone(ref label) if label == "tri.obj"),
            "got {err:?}"
        );
    }

    #[test]
    fn test_fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tri.obj"), TRIANGLE).unwrap();

        let loader = AssetLoader::new(FsSource::new(dir.path()));
        let meshes = loader.load_models(&["tri.obj"]).join().unwrap();
        assert_eq!(meshes[0].vertex_count(), 3);

        let err = loader.source().read("nope.obj").unwrap_err();
        assert!(err.to_string().contains("nope.obj"), "message lacks path: {err}");
    }

    #[test]
    fn test_bad_texture_fails_batch() {
        let loader = AssetLoader::new(MemorySource::new().with("grass.jpg", b"not a jpeg".to_vec()));
        let result = loader.load_texture("grass.jpg").join();
        assert!(matches!(result, Err(AssetError::Image(_))), "got {result:?}");
    }
}
