pub mod half;
pub mod payload;
