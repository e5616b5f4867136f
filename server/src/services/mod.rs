//! 后台服务

pub mod sweep;

pub use sweep::SweepService;
