//! The loader service
//!
//! An explicitly constructed `AssetServer` instance replaces any module-level
//! loader state. Decodes run on worker threads; completions arrive on a
//! channel the frame loop drains with [`AssetServer::poll_completed`], so no
//! two completions ever interleave mid-execution. Every load hands back a
//! cancellation token: a removed host element cancels its ticket and the
//! late completion is dropped instead of touching a dead element.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::error::AssetError;
use crate::gltf_loader::decode_gltf;
use crate::mesh::RawAsset;
use crate::stl::decode_stl;

/// Unique identifier of one load request.
pub type LoadId = Uuid;

/// Recognized model formats, detected from the source extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshFormat {
    /// Surface-scan / CAD triangle soup.
    Stl,
    /// Scene-graph packed format (.gltf / .glb).
    Gltf,
}

impl MeshFormat {
    /// Detect the format from a source locator, case-insensitively.
    pub fn from_source(source: &str) -> Option<Self> {
        let lower = source.to_ascii_lowercase();
        if lower.ends_with(".stl") {
            Some(MeshFormat::Stl)
        } else if lower.ends_with(".gltf") || lower.ends_with(".glb") {
            Some(MeshFormat::Gltf)
        } else {
            None
        }
    }
}

/// A decoder turning raw bytes into a [`RawAsset`].
pub trait MeshDecoder: Send + Sync {
    fn decode(&self, source: &str, bytes: &[u8]) -> Result<RawAsset, AssetError>;
}

struct StlDecoder;

impl MeshDecoder for StlDecoder {
    fn decode(&self, source: &str, bytes: &[u8]) -> Result<RawAsset, AssetError> {
        decode_stl(source, bytes).map(RawAsset::SingleMesh)
    }
}

struct GltfDecoder;

impl MeshDecoder for GltfDecoder {
    fn decode(&self, source: &str, bytes: &[u8]) -> Result<RawAsset, AssetError> {
        let scene = decode_gltf(source, bytes)?;
        match scene.mesh_count() {
            0 => Err(AssetError::NoRenderableMesh(source.to_string())),
            // A single-mesh scene collapses to the plain mesh path.
            1 => Ok(RawAsset::SingleMesh(
                scene.take_single_mesh().expect("counted one mesh"),
            )),
            _ => Ok(RawAsset::MultiMeshScene(scene)),
        }
    }
}

/// Cancellation handle for an in-flight load.
#[derive(Debug, Clone)]
pub struct LoadToken {
    cancelled: Arc<AtomicBool>,
}

impl LoadToken {
    fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Invalidate the pending completion. Safe to call at any point; a load
    /// that already completed is simply never surfaced.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Receipt for a load request: its id plus the cancellation token.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    pub id: LoadId,
    pub token: LoadToken,
}

/// A finished load, delivered on the frame thread.
#[derive(Debug)]
pub struct LoadCompletion {
    pub id: LoadId,
    pub source: String,
    pub result: Result<RawAsset, AssetError>,
}

struct Delivery {
    completion: LoadCompletion,
    token: LoadToken,
}

type UrlRewriter = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Central loader service. Owns format detection, the decoder registry, the
/// URL-remapping hook, and the completion channel.
pub struct AssetServer {
    base_path: PathBuf,
    decoders: HashMap<MeshFormat, Arc<dyn MeshDecoder>>,
    rewriter: Option<UrlRewriter>,
    tx: Sender<Delivery>,
    rx: Receiver<Delivery>,
}

impl AssetServer {
    /// Create a new AssetServer rooted at the given base path, with the STL
    /// and glTF decoders registered.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("AssetServer created with base path: {}", base_path.display());
        let (tx, rx) = channel();
        let mut decoders: HashMap<MeshFormat, Arc<dyn MeshDecoder>> = HashMap::new();
        decoders.insert(MeshFormat::Stl, Arc::new(StlDecoder));
        decoders.insert(MeshFormat::Gltf, Arc::new(GltfDecoder));
        Self {
            base_path,
            decoders,
            rewriter: None,
            tx,
            rx,
        }
    }

    /// Replace the decoder for a format (or register a new one).
    pub fn register_decoder(&mut self, format: MeshFormat, decoder: Arc<dyn MeshDecoder>) {
        self.decoders.insert(format, decoder);
    }

    /// Install a hook applied to every source locator before resolution, so
    /// callers can substitute locally buffered content for a logical name.
    pub fn set_url_rewriter(
        &mut self,
        rewriter: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        self.rewriter = Some(Box::new(rewriter));
    }

    /// Resolve a relative asset path against the base path.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// Start loading a model. Returns immediately; the result arrives via
    /// [`AssetServer::poll_completed`] unless the ticket is cancelled first.
    pub fn load(&self, source: &str) -> LoadTicket {
        let id = Uuid::new_v4();
        let token = LoadToken::new();
        let ticket = LoadTicket {
            id,
            token: token.clone(),
        };

        let source = match &self.rewriter {
            Some(rewrite) => rewrite(source),
            None => source.to_string(),
        };

        let Some(format) = MeshFormat::from_source(&source) else {
            error!("unsupported model format: '{}'", source);
            self.deliver(id, source.clone(), Err(AssetError::UnsupportedFormat(source)), token);
            return ticket;
        };

        let decoder = Arc::clone(&self.decoders[&format]);
        let path = self.resolve(Path::new(&source));
        let tx = self.tx.clone();
        let worker_token = token.clone();

        std::thread::spawn(move || {
            let result = fetch_and_decode(&source, &path, decoder.as_ref());
            match &result {
                Ok(asset) => debug!("loaded '{}' ({} meshes)", source, asset.mesh_count()),
                Err(e) => error!("load of '{}' failed: {}", source, e),
            }
            // Receiver gone means the server was dropped mid-flight.
            let _ = tx.send(Delivery {
                completion: LoadCompletion { id, source, result },
                token: worker_token,
            });
        });

        ticket
    }

    fn deliver(
        &self,
        id: LoadId,
        source: String,
        result: Result<RawAsset, AssetError>,
        token: LoadToken,
    ) {
        let _ = self.tx.send(Delivery {
            completion: LoadCompletion { id, source, result },
            token,
        });
    }

    /// Drain finished loads. Called from the frame thread; completions whose
    /// ticket was cancelled are dropped here.
    pub fn poll_completed(&self) -> Vec<LoadCompletion> {
        self.rx
            .try_iter()
            .filter(|delivery| !delivery.token.is_cancelled())
            .map(|delivery| delivery.completion)
            .collect()
    }
}

fn fetch_and_decode(
    source: &str,
    path: &Path,
    decoder: &dyn MeshDecoder,
) -> Result<RawAsset, AssetError> {
    if !path.exists() {
        return Err(AssetError::NotFound(path.to_path_buf()));
    }
    let bytes = std::fs::read(path).map_err(|e| AssetError::Io(path.to_path_buf(), e))?;
    decoder.decode(source, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn wait_for_completions(server: &AssetServer) -> Vec<LoadCompletion> {
        for _ in 0..100 {
            let done = server.poll_completed();
            if !done.is_empty() {
                return done;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        Vec::new()
    }

    #[test]
    fn format_detection() {
        assert_eq!(MeshFormat::from_source("part.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_source("Part.STL"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_source("scene.glb"), Some(MeshFormat::Gltf));
        assert_eq!(MeshFormat::from_source("scene.gltf"), Some(MeshFormat::Gltf));
        assert_eq!(MeshFormat::from_source("notes.txt"), None);
    }

    #[test]
    fn unsupported_format_surfaces_as_completion() {
        let server = AssetServer::new("/nonexistent");
        let ticket = server.load("model.obj");
        let done = wait_for_completions(&server);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, ticket.id);
        match &done[0].result {
            Err(AssetError::UnsupportedFormat(_)) => {}
            other => panic!("expected UnsupportedFormat, got: {:?}", other),
        }
    }

    #[test]
    fn missing_file_reports_not_found() {
        let server = AssetServer::new("/nonexistent");
        server.load("does_not_exist.stl");
        let done = wait_for_completions(&server);
        assert_eq!(done.len(), 1);
        match &done[0].result {
            Err(AssetError::NotFound(_)) => {}
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn cancelled_ticket_never_surfaces() {
        let server = AssetServer::new("/nonexistent");
        let ticket = server.load("does_not_exist.stl");
        ticket.token.cancel();
        // Give the worker time to deliver; the poll must still drop it.
        std::thread::sleep(Duration::from_millis(50));
        assert!(server.poll_completed().is_empty());
    }

    #[test]
    fn url_rewriter_applies_before_resolution() {
        let mut server = AssetServer::new("/nonexistent");
        server.set_url_rewriter(|logical| format!("{logical}.stl"));
        server.load("part");
        let done = wait_for_completions(&server);
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].source, "part.stl");
    }

    #[test]
    fn resolve_relative_and_absolute() {
        let server = AssetServer::new("/home/user/assets");
        assert_eq!(
            server.resolve(Path::new("models/box.glb")),
            PathBuf::from("/home/user/assets/models/box.glb")
        );
        assert_eq!(
            server.resolve(Path::new("/absolute/path.glb")),
            PathBuf::from("/absolute/path.glb")
        );
    }
}
