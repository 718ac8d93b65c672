pub mod command;
pub mod workdir;
