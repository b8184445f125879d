//! CART regression trees.

mod cart;

pub use cart::{DecisionTreeRegressor, MaxFeatures, Splitter, TreeParams};
