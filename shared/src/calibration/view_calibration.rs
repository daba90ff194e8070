use cavesync_serde::{ByteReader, ByteWriter, ConstByteLength, Serde, SerdeErr};

use crate::{
    calibration::screen::ScreenGeometry,
    config::cluster_config::ViewConfig,
    math::{mat4::Mat4, vec3::Vec3},
};

/// Everything a render node needs to draw its wall for one tick: one
/// projection per eye and the shared scene transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewCalibration {
    pub left: Mat4,
    pub right: Mat4,
    pub scene: Mat4,
}

impl ViewCalibration {
    /// Combines a wall's static geometry with the tracked head pose.
    ///
    /// The eyes sit half the eye separation to either side of the head
    /// origin along the head's x axis. Returns `None` while either eye is
    /// on or behind the screen plane, where no frustum exists.
    pub fn compute(
        screen: &ScreenGeometry,
        view: &ViewConfig,
        head_pose: &Mat4,
        scene: &Mat4,
    ) -> Option<Self> {
        let head = head_pose.translation();
        let half_offset = head_pose
            .transform_vector(Vec3::X)
            .normalize()
            .unwrap_or(Vec3::X)
            * (view.eye_separation * 0.5);

        let left = off_axis_projection(screen, head - half_offset, view.near, view.far)?;
        let right = off_axis_projection(screen, head + half_offset, view.near, view.far)?;

        Some(Self {
            left,
            right,
            scene: *scene,
        })
    }
}

/// Generalized perspective projection for an eye looking through an
/// arbitrarily placed rectangular screen.
pub fn off_axis_projection(
    screen: &ScreenGeometry,
    eye: Vec3,
    near: f32,
    far: f32,
) -> Option<Mat4> {
    let basis = screen.basis()?;

    let to_lower_left = screen.lower_left - eye;
    let to_lower_right = screen.lower_right - eye;
    let to_upper_left = screen.upper_left - eye;

    let distance = -to_lower_left.dot(basis.normal);
    if distance <= f32::EPSILON {
        return None;
    }

    let scale = near / distance;
    let left = basis.right.dot(to_lower_left) * scale;
    let right = basis.right.dot(to_lower_right) * scale;
    let bottom = basis.up.dot(to_lower_left) * scale;
    let top = basis.up.dot(to_upper_left) * scale;

    let frustum = Mat4::frustum(left, right, bottom, top, near, far);
    let rotation = Mat4::from_basis_rows(basis.right, basis.up, basis.normal);
    let eye_offset = Mat4::from_translation(-eye);

    let projection = frustum * rotation * eye_offset;
    projection.is_finite().then_some(projection)
}

impl Serde for ViewCalibration {
    fn ser(&self, writer: &mut ByteWriter) {
        self.left.ser(writer);
        self.right.ser(writer);
        self.scene.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let left = Mat4::de(reader)?;
        let right = Mat4::de(reader)?;
        let scene = Mat4::de(reader)?;
        Ok(Self { left, right, scene })
    }

    fn byte_length(&self) -> usize {
        Self::const_byte_length()
    }
}

impl ConstByteLength for ViewCalibration {
    fn const_byte_length() -> usize {
        Mat4::const_byte_length() * 3
    }
}
