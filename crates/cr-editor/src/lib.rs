pub mod emergency;
pub mod engine;
pub mod feedback;
pub mod history;
pub mod overflow;
pub mod rearrange;
pub mod recommend;
pub mod scaling;
pub mod strategy;

pub use engine::{EngineError, NullSurface, RenderSurface, ResizeEngine, ResizeOutcome, ResizePhase};
pub use feedback::{DeferredFeedback, FeedbackEvent, FeedbackScheduler, NoFeedback, SubscriptionId};
pub use history::HistoryLog;
pub use overflow::{OverflowClassifier, OverflowReport};
pub use recommend::{HeuristicRecommender, Recommendation, Recommender, ResizeContext};
pub use strategy::{Strategy, StrategyError, StrategyInput};
