pub mod tracker;

pub use tracker::RewardHistory;
