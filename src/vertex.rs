// Mesh positions arrive as a tightly packed stream of three f32s per vertex,
// the same layout a renderer would upload as its position buffer
use crate::rig_error::RigError;
use bytemuck::{Pod, Zeroable};
use nalgebra_glm as glm;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Zeroable, Pod)]
pub struct Position {
    pub position: [f32; 3],
}

impl From<Position> for glm::Vec3 {
    fn from(p: Position) -> Self {
        Self::from(p.position)
    }
}

impl From<&glm::Vec3> for Position {
    fn from(v: &glm::Vec3) -> Self {
        Self {
            position: [v.x, v.y, v.z],
        }
    }
}

const STRIDE: usize = std::mem::size_of::<Position>();

/// Reads a packed position stream. The buffer need not be aligned.
///
/// # Errors
/// Returns `RigError::DataNotConverted` if the length isn't a whole number
/// of positions
pub fn positions_from_bytes(bytes: &[u8]) -> Result<Vec<glm::Vec3>, RigError> {
    if bytes.len() % STRIDE != 0 {
        return Err(RigError::DataNotConverted);
    }
    Ok(bytes
        .chunks_exact(STRIDE)
        .map(|chunk| bytemuck::pod_read_unaligned::<Position>(chunk).into())
        .collect())
}

/// Packs positions for upload
#[must_use]
pub fn positions_to_buffer(positions: &[glm::Vec3]) -> Vec<Position> {
    positions.iter().map(Position::from).collect()
}
