pub mod net;
pub mod pipeline;
pub mod section;
pub mod types;
