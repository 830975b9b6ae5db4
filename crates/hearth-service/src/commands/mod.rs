//! One module per command group, mirroring `astrid-cli`'s
//! `commands/` layout.

pub mod agents;
pub mod sessions;
