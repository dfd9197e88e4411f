pub mod provider;
pub mod types;

pub use provider::{ChainFile, JsonChainProvider, MarketDataError, MarketDataProvider, StaticProvider};
pub use types::{MarketSnapshot, OptionQuote, OptionType, OptionsChain, PositionSide};
