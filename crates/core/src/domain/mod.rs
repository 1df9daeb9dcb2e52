pub mod product;
pub mod sales_rate;
