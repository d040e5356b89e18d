//! Durable state for brokers, resources, and their operation records.
//!
//! Provides `LifecycleDb` — the single store all components mutate through.
//! Its write transactions are what make `begin_operation` atomic, which is
//! the core correctness property of the whole subsystem.

pub mod db;

pub use db::LifecycleDb;
