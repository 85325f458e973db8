//! Market-data inputs: price files and the log-return panels built from them.

pub mod prices;

pub use prices::{
    DataError, PriceFileFormat, SeriesOrder, align_returns, load_price_series,
    load_return_matrix, log_returns, read_price_series,
};
