mod driver;
mod progress;
mod sink;

pub use driver::{TDPipeError, TDPiper};
pub use progress::ProgressRecord;
