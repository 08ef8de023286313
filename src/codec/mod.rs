pub mod jpeg;
pub mod nv21;
pub mod planar;
