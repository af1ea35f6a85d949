//! Daily collection pass
//!
//! One pass walks the tracked universe strictly sequentially (the
//! provider carries a courtesy delay between instruments), computes both
//! RSI windows for today and yesterday, keeps the notable records, and
//! hands them to the dataset store.

mod assembler;
mod run;

pub use assembler::RecordAssembler;
pub use run::{Collector, RunSummary};
