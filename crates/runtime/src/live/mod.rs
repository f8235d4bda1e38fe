pub mod fetch;
pub mod source;

pub use fetch::{
    extract_price, FetchError, PriceFetcher, PriceOrigin, ResolvedPrice, DEFAULT_FETCH_TIMEOUT,
    PRICE_KEYS,
};
pub use source::{resolve_prices, LivePrices, LiveSource, PriceEndpoints};
