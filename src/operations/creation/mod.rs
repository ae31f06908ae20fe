mod make_box;
mod make_compound;
mod make_cylinder;

pub use make_compound::CompoundBuilder;
pub(crate) use make_box::MakeBox;
pub(crate) use make_cylinder::MakeCylinder;
