pub mod stock_chart;

pub use stock_chart::StockChart;
