//! Perspective projection onto terminal cells

use arplace::{CameraConfig, Point3D, Pose, Transform};

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// Perspective camera looking down its local -Z axis
#[derive(Debug, Clone)]
pub struct Projection {
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Viewport width / height in physical units
    pub aspect: f32,
}

impl Projection {
    pub fn from_camera(camera: &CameraConfig, width: u32, height: u32) -> Self {
        Self {
            fov: camera.fov.to_radians(),
            near: camera.near,
            far: camera.far,
            aspect: Self::aspect_for(width, height),
        }
    }

    pub fn aspect_for(width: u32, height: u32) -> f32 {
        width.max(1) as f32 / (height.max(1) as f32 * CELL_ASPECT)
    }

    /// Project a tracking-space point to normalized device coordinates
    /// (-1 to 1) plus a 0-1 depth
    pub fn project(&self, point: Point3D, camera: &Transform) -> Option<(f32, f32, f32)> {
        let local = camera.inverse_transform_point(point);
        let distance = -local.z;

        if distance <= self.near || distance >= self.far {
            return None;
        }

        let tan_half_fov = (self.fov / 2.0).tan();
        let x_ndc = local.x / (distance * tan_half_fov * self.aspect);
        let y_ndc = local.y / (distance * tan_half_fov);

        if x_ndc.abs() > 1.0 || y_ndc.abs() > 1.0 {
            return None;
        }

        let depth = (distance - self.near) / (self.far - self.near);
        Some((x_ndc, y_ndc, depth))
    }

    /// Convert normalized device coordinates to a cell position
    pub fn ndc_to_screen(&self, x_ndc: f32, y_ndc: f32, width: u32, height: u32) -> (u16, u16) {
        let x = ((x_ndc + 1.0) / 2.0 * width as f32).round() as u16;
        let y = ((1.0 - y_ndc) / 2.0 * height as f32).round() as u16;

        let x = x.min(width.saturating_sub(1) as u16);
        let y = y.min(height.saturating_sub(1) as u16);

        (x, y)
    }

    pub fn project_to_screen(
        &self,
        point: Point3D,
        camera: &Pose,
        width: u32,
        height: u32,
    ) -> Option<(u16, u16, f32)> {
        let (x_ndc, y_ndc, depth) = self.project(point, &camera.to_transform())?;
        let (x, y) = self.ndc_to_screen(x_ndc, y_ndc, width, height);
        Some((x, y, depth))
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self::from_camera(&CameraConfig::default(), 80, 24)
    }
}
