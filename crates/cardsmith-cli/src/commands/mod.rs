pub mod render;
pub mod serve;
pub mod theme;
