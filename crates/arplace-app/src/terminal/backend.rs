//! Terminal render backend

use std::io::{self, Stdout, Write};

use arplace::render::{Geometry, MaterialHandle, NodeHandle, NodeKind, SceneId};
use arplace::{
    CameraConfig, MaterialConfig, Point3D, Pose, RenderBackend, RenderError, SceneGraph, SceneNode,
};
use crossterm::style::Color;
use crossterm::terminal;

use super::{Canvas, Projection};

const RETICLE_COLOR: Color = Color::Rgb { r: 0, g: 255, b: 128 };
const BACKDROP_COLOR: Color = Color::Rgb { r: 55, g: 65, b: 80 };
const LIGHT_COLOR: Color = Color::Rgb { r: 255, g: 230, b: 150 };
const SEGMENTS: usize = 16;

/// One line of HUD text
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine {
    pub text: String,
    pub color: Color,
}

impl OverlayLine {
    pub fn new(text: impl Into<String>, color: Color) -> Self {
        Self {
            text: text.into(),
            color,
        }
    }
}

/// Rasterizes the scene graph into terminal cells with a depth buffer.
///
/// The backdrop stands in for the camera passthrough and is drawn behind
/// every scene node; overlay lines are drawn on top.
pub struct TerminalBackend<W: Write = Stdout> {
    out: W,
    graph: SceneGraph,
    canvas: Canvas,
    projection: Projection,
    attached: bool,
    backdrop: Vec<Point3D>,
    header: Vec<OverlayLine>,
    footer: Vec<OverlayLine>,
}

impl TerminalBackend<Stdout> {
    /// Backend sized to the current terminal
    pub fn stdout(camera: &CameraConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::new(io::stdout(), camera, width as u32, height as u32))
    }
}

impl<W: Write> TerminalBackend<W> {
    pub fn new(out: W, camera: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            out,
            graph: SceneGraph::new(),
            canvas: Canvas::new(width, height),
            projection: Projection::from_camera(camera, width, height),
            attached: false,
            backdrop: Vec::new(),
            header: Vec::new(),
            footer: Vec::new(),
        }
    }

    pub fn set_backdrop(&mut self, points: Vec<Point3D>) {
        self.backdrop = points;
    }

    /// HUD lines for the next frame, anchored to the top and bottom rows
    pub fn set_overlay(&mut self, header: Vec<OverlayLine>, footer: Vec<OverlayLine>) {
        self.header = header;
        self.footer = footer;
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Draw only the overlay; used while no session owns the surface
    pub fn present_idle(&mut self) -> io::Result<()> {
        self.canvas.clear();
        self.draw_overlay();
        self.canvas.flush(&mut self.out)
    }

    /// Draw `scene` from `camera` into the canvas without flushing
    pub fn rasterize(&mut self, scene: SceneId, camera: &Pose) {
        self.canvas.clear();
        let (width, height) = (self.canvas.width(), self.canvas.height());

        let projection = &self.projection;
        for point in &self.backdrop {
            let projected = projection.project_to_screen(*point, camera, width, height);
            if let Some((x, y, depth)) = projected {
                self.canvas.plot(x, y, '·', BACKDROP_COLOR, depth);
            }
        }

        for (_, node) in self.graph.nodes_in(scene) {
            if !node.visible {
                continue;
            }
            draw_node(&mut self.canvas, &self.projection, &self.graph, node, camera);
        }

        self.draw_overlay();
    }

    fn draw_overlay(&mut self) {
        for (row, line) in self.header.iter().enumerate() {
            self.canvas.text(0, row as u16, &line.text, line.color);
        }
        let height = self.canvas.height() as usize;
        let first = height.saturating_sub(self.footer.len());
        for (i, line) in self.footer.iter().enumerate() {
            self.canvas.text(0, (first + i) as u16, &line.text, line.color);
        }
    }
}

fn draw_node(
    canvas: &mut Canvas,
    projection: &Projection,
    graph: &SceneGraph,
    node: &SceneNode,
    camera: &Pose,
) {
    let (width, height) = (canvas.width(), canvas.height());
    let project = |p: Point3D| {
        projection.project_to_screen(node.transform.transform_point(p), camera, width, height)
    };

    match &node.kind {
        NodeKind::Light(_) => {
            if let Some((x, y, depth)) = project(Point3D::ORIGIN) {
                canvas.plot(x, y, '*', LIGHT_COLOR, depth);
            }
        }
        NodeKind::Reticle | NodeKind::Model => {
            for mesh in &node.meshes {
                let (symbol, color) = match node.kind {
                    NodeKind::Reticle => (None, RETICLE_COLOR),
                    _ => mesh_style(graph, mesh.material),
                };
                for (a, b) in edges(&mesh.geometry) {
                    match (project(a), project(b)) {
                        (Some(from), Some(to)) => canvas.line(from, to, symbol, color),
                        (Some((x, y, depth)), None) | (None, Some((x, y, depth))) => {
                            canvas.plot(x, y, symbol.unwrap_or('•'), color, depth);
                        }
                        (None, None) => {}
                    }
                }
            }
        }
    }
}

/// Solid models draw blocks, wireframe models draw slope glyphs
fn mesh_style(graph: &SceneGraph, material: Option<MaterialHandle>) -> (Option<char>, Color) {
    let config = material
        .and_then(|m| graph.material(m).copied())
        .unwrap_or_else(MaterialConfig::default);
    let color = Color::Rgb {
        r: config.color.r,
        g: config.color.g,
        b: config.color.b,
    };
    if config.wireframe {
        (None, color)
    } else {
        (Some('█'), color)
    }
}

/// Local-space edges outlining a mesh
fn edges(geometry: &Geometry) -> Vec<(Point3D, Point3D)> {
    let points = geometry.outline_points(SEGMENTS);
    let ring = |pts: &[Point3D]| -> Vec<(Point3D, Point3D)> {
        (0..pts.len()).map(|i| (pts[i], pts[(i + 1) % pts.len()])).collect()
    };

    match geometry {
        Geometry::Ring { .. } => ring(&points),
        Geometry::Cone { .. } => {
            let n = SEGMENTS;
            let mut out = ring(&points[..n]);
            if let Some(apex) = points.last() {
                out.extend((0..n).step_by(n / 4).map(|i| (points[i], *apex)));
            }
            out
        }
        Geometry::Cuboid { .. } => {
            let mut out = ring(&points[..4]);
            out.extend(ring(&points[4..8]));
            out.extend((0..4).map(|i| (points[i], points[i + 4])));
            out
        }
    }
}

impl<W: Write> RenderBackend for TerminalBackend<W> {
    fn attach_surface(&mut self) -> Result<(), RenderError> {
        self.attached = true;
        self.canvas.clear();
        Ok(())
    }

    fn detach_surface(&mut self) {
        self.attached = false;
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width != self.canvas.width() || height != self.canvas.height() {
            self.canvas.resize(width, height);
            self.projection.aspect = Projection::aspect_for(width, height);
        }
    }

    fn create_scene(&mut self) -> SceneId {
        self.graph.create_scene()
    }

    fn dispose_scene(&mut self, scene: SceneId) {
        self.graph.dispose_scene(scene);
    }

    fn add_node(&mut self, scene: SceneId, node: SceneNode) -> Result<NodeHandle, RenderError> {
        self.graph.add_node(scene, node)
    }

    fn remove_node(&mut self, node: NodeHandle) {
        self.graph.remove_node(node);
    }

    fn set_node_transform(
        &mut self,
        node: NodeHandle,
        transform: &Pose,
    ) -> Result<(), RenderError> {
        self.graph.set_node_transform(node, transform)
    }

    fn set_node_visible(&mut self, node: NodeHandle, visible: bool) -> Result<(), RenderError> {
        self.graph.set_node_visible(node, visible)
    }

    fn create_standard_material(&mut self, config: &MaterialConfig) -> MaterialHandle {
        self.graph.create_material(config)
    }

    fn dispose_material(&mut self, material: MaterialHandle) {
        self.graph.remove_material(material);
    }

    fn update_material(
        &mut self,
        material: MaterialHandle,
        config: &MaterialConfig,
    ) -> Result<(), RenderError> {
        self.graph.update_material(material, config)
    }

    fn submit_frame(&mut self, scene: SceneId, camera: &Pose) -> Result<(), RenderError> {
        if !self.attached {
            return Err(RenderError::Surface("surface is detached".to_string()));
        }
        if !self.graph.has_scene(scene) {
            return Err(RenderError::UnknownScene(scene.0));
        }
        self.rasterize(scene, camera);
        self.canvas
            .flush(&mut self.out)
            .map_err(|e| RenderError::Frame(e.to_string()))
    }
}
