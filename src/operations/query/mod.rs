mod bounding_box;
mod closest_point;
mod volume;

pub(crate) use bounding_box::{Aabb, BoundingBox};
pub(crate) use closest_point::{face_contains, outward_normal, planes_meet};
pub(crate) use volume::{solid_volume, Volume};
