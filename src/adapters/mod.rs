// Adapters layer: concrete implementations for external systems (dataset file, agent platform, downstream services).

pub mod downstream;
pub mod foundry;
pub mod storage;
