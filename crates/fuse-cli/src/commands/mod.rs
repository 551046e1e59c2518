pub mod assets;
pub mod pool;
