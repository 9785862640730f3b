pub mod error;
pub mod linker;

pub use error::LinkError;
pub use linker::link;
