pub mod coordinate;
pub mod product;
