pub mod session;

pub use session::{MotionSession, SampleError, SessionState};
