//! Records exchanged between engine stages.

mod data_size_label;
mod evaluation_record;
mod feature_stats;
mod model_status;
mod routing_label;
mod selection_result;

pub use data_size_label::DataSizeLabel;
pub use evaluation_record::EvaluationRecord;
pub use feature_stats::FeatureStats;
pub use model_status::ModelStatus;
pub use routing_label::RoutingLabel;
pub use selection_result::SelectionResult;
