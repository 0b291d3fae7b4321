// ABOUTME: Transport adapters normalizing agent runtimes to the event-channel contract.
// ABOUTME: process spawns a CLI and parses stdout; stream drives an in-process sequence.

pub mod mock;
pub mod process;
pub mod stream;
