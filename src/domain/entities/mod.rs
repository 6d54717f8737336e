pub mod order;
pub mod plan;
pub mod subscription;
pub mod usage;
