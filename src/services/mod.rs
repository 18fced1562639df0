//! Service layer separating file I/O from the removal logic

pub mod io;

pub use io::OutputService;
