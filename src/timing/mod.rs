//! Speaking-time estimation and subtitle timing
//!
//! Estimates are rescaled to the measured audio duration and then projected
//! onto display captions that are segmented independently of the voice script.

mod estimator;
mod reconciler;
mod sentences;
mod srt;

pub use estimator::{estimate, is_cjk_ideograph};
pub use reconciler::{MappingPolicy, ReconcileError, Reconciler, SubtitleTimestamp};
pub use sentences::split_sentences;
pub use srt::to_srt;
