//! Model loader that pretends to download built-in assets

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use arplace::render::{Geometry, Mesh};
use arplace::{LoadError, ModelLoader, SceneNode, Vector3D};
use futures::future::BoxFuture;
use futures::FutureExt;

/// Resolves `.glb`/`.gltf` URLs to built-in shapes after a fixed delay
#[derive(Debug, Clone)]
pub struct SimLoader {
    delay: Duration,
}

impl SimLoader {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl ModelLoader for SimLoader {
    fn load(&self, url: &str) -> BoxFuture<'static, Result<SceneNode, LoadError>> {
        tracing::debug!(url, delay_ms = self.delay.as_millis() as u64, "download started");
        Download {
            url: url.to_string(),
            ready_at: Instant::now() + self.delay,
        }
        .boxed()
    }
}

struct Download {
    url: String,
    ready_at: Instant,
}

impl Future for Download {
    type Output = Result<SceneNode, LoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if Instant::now() < self.ready_at {
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        Poll::Ready(builtin_model(&self.url))
    }
}

/// Decode a URL into one of the built-in assets
pub fn builtin_model(url: &str) -> Result<SceneNode, LoadError> {
    let path = Path::new(url);
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !matches!(extension, "glb" | "gltf") {
        return Err(LoadError::Decode {
            url: url.to_string(),
            reason: format!("unsupported format '{}'", extension),
        });
    }

    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let meshes = match stem {
        "cone" => vec![Mesh::new("cone", Geometry::Cone { radius: 0.1, height: 0.3 })],
        "crate" => vec![
            Mesh::new("body", Geometry::Cuboid { size: Vector3D::new(0.3, 0.3, 0.3) }),
            Mesh::new("lid", Geometry::Cuboid { size: Vector3D::new(0.32, 0.33, 0.32) }),
        ],
        "lamp" => vec![
            Mesh::new("base", Geometry::Cuboid { size: Vector3D::new(0.2, 0.04, 0.2) }),
            Mesh::new("shade", Geometry::Cone { radius: 0.15, height: 0.45 }),
        ],
        "marker" => vec![Mesh::new(
            "disc",
            Geometry::Ring {
                inner_radius: 0.0,
                outer_radius: 0.12,
            },
        )],
        _ => return Err(LoadError::NotFound(url.to_string())),
    };
    Ok(SceneNode::model(stem, meshes))
}
