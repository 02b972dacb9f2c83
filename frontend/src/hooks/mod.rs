pub mod use_stock_data;

pub use use_stock_data::use_stock_data;
