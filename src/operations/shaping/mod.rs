mod extrude;
mod loft;

pub(crate) use extrude::Extrude;
pub use loft::Loft;
