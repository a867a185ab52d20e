mod blob;
mod clob;
mod fetch;
mod lob_writer;
mod nclob;
pub(crate) mod wire;

pub use blob::BLob;
pub use clob::CLob;
pub use nclob::NCLob;

pub(crate) use lob_writer::LobWriter;
