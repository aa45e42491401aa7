pub mod combination;
pub mod idea;
