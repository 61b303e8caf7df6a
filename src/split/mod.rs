//! Split allocation: turning a total and an allocation rule into
//! per-participant owed amounts.

pub mod allocator;
