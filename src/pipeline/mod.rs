pub mod build;
pub mod bundle;
pub mod generate;
pub mod normalize;
