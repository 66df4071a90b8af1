pub mod config;
pub mod done;
pub mod new;
pub mod plan;
pub mod serve;
pub mod status;
