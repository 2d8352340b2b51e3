//! Synthetic vehicle track generator.
//!
//! - **component_a:** Track model + periodic generator (timed producer).
//! - **component_b:** Reporter (consumer loop, speed filter, stdout lines).
//! - **utils:** Configuration, cancellation token, run metrics.

pub mod component_a;
pub mod component_b;
pub mod utils;
