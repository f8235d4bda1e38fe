pub mod backtest;
pub mod engine;
pub mod events;
pub mod live;
pub mod replay;
pub mod source;
pub mod stream;

pub use backtest::{run_backtest, run_backtest_with, summarize};
pub use engine::{step, EngineParams, SessionEngine};
pub use events::{
    BacktestEvent, BacktestResult, BacktestSummary, FeedMode, LiveTag, StreamEvent, TickEvent,
};
pub use source::{InputSource, ReplaySource, TickInput};
pub use stream::event_stream;
