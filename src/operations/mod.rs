pub mod boolean;
pub mod creation;
pub mod modification;
pub mod query;
pub mod shaping;

pub use creation::CompoundBuilder;
pub use modification::{FilletBuilder, ShellBuilder};
pub use shaping::Loft;
