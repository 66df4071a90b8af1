pub mod cycle;
pub mod health;
