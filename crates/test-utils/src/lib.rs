pub mod builders;
pub mod sink;

pub use builders::{TestBed, TestClassBuilder, TestStep};
pub use sink::MemorySink;
