//! Consumer side: the I/O worker and the files it owns.

pub mod worker;
pub mod writers;
