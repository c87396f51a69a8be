pub mod persistence;
pub mod system;
