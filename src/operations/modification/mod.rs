mod fillet;
mod shell;

pub use fillet::FilletBuilder;
pub use shell::ShellBuilder;
