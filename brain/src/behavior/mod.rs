pub mod aim;
pub mod crash;
pub mod items;
pub mod movement;
pub mod skid;
