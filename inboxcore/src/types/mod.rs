pub mod raw;
pub mod view;
pub mod wire;
