pub mod csv_export;
pub mod market_data;
