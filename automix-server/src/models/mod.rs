pub mod plan;
pub mod request;
pub mod summary;

pub use plan::{FxEvent, FxKind, MixMode, PlanOverride, TransitionPlan, TransitionStyle};
pub use request::{MergeRequest, MergeResponse};
pub use summary::{PhraseSpan, TrackAnalysis};
