pub mod drive;
pub mod path;
