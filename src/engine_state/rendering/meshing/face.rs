use cgmath::Point3;

use crate::engine_state::voxels::block::block_side::BlockSide;

/// Index pattern that splits a quad `[ll, lr, ur, ul]` into two triangles.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-right,
/// upper-left) as seen by a viewer outside the block looking at that side. Taken
/// in that order the corners wind counter-clockwise, so both triangles of
/// [`QUAD_INDICES`] face outward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in world coordinates
    pub ll: Point3<f32>,
    /// Lower-right corner of the face in world coordinates
    pub lr: Point3<f32>,
    /// Upper-right corner of the face in world coordinates
    pub ur: Point3<f32>,
    /// Upper-left corner of the face in world coordinates
    pub ul: Point3<f32>,
    /// Which side of the block this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates the face on `block_side` of the unit voxel whose minimum corner is `(x, y, z)`.
    pub fn new(x: f32, y: f32, z: f32, block_side: BlockSide) -> Self {
        let [ll, lr, ur, ul] = Self::corner_offsets(block_side);
        let at = |o: [f32; 3]| Point3::new(x + o[0], y + o[1], z + o[2]);

        Face {
            ll: at(ll),
            lr: at(lr),
            ur: at(ur),
            ul: at(ul),
            block_side,
        }
    }

    /// Unit-cube corner offsets of a side, in `[ll, lr, ur, ul]` order.
    pub const fn corner_offsets(block_side: BlockSide) -> [[f32; 3]; 4] {
        match block_side {
            BlockSide::FRONT => [[0., 0., 1.], [1., 0., 1.], [1., 1., 1.], [0., 1., 1.]],
            BlockSide::BACK => [[1., 0., 0.], [0., 0., 0.], [0., 1., 0.], [1., 1., 0.]],
            BlockSide::BOTTOM => [[0., 0., 0.], [1., 0., 0.], [1., 0., 1.], [0., 0., 1.]],
            BlockSide::TOP => [[0., 1., 1.], [1., 1., 1.], [1., 1., 0.], [0., 1., 0.]],
            BlockSide::LEFT => [[0., 0., 0.], [0., 0., 1.], [0., 1., 1.], [0., 1., 0.]],
            BlockSide::RIGHT => [[1., 0., 1.], [1., 0., 0.], [1., 1., 0.], [1., 1., 1.]],
        }
    }

    pub fn corners(&self) -> [Point3<f32>; 4] {
        [self.ll, self.lr, self.ur, self.ul]
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{InnerSpace, Vector3};

    use super::*;

    #[test]
    fn test_winding_faces_outward() {
        for side in BlockSide::all() {
            let face = Face::new(3.0, -2.0, 7.0, side);
            let [ll, lr, ur, _] = face.corners();
            let normal = (lr - ll).cross(ur - ll).normalize();
            let expected: Vector3<f32> = side.normal().into();
            assert!((normal - expected).magnitude() < 1e-6, "{side:?} winds inward");
        }
    }

    #[test]
    fn test_corners_lie_on_the_side() {
        for side in BlockSide::all() {
            let normal = side.normal();
            for corner in Face::corner_offsets(side) {
                for axis in 0..3 {
                    if normal[axis] > 0.0 {
                        assert_eq!(corner[axis], 1.0);
                    } else if normal[axis] < 0.0 {
                        assert_eq!(corner[axis], 0.0);
                    }
                }
            }
        }
    }
}
