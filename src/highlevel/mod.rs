//! High-level convenience API.
//!
//! This layer provides [`Engine`], an ergonomic facade that owns a
//! [`HyperEncoder`](crate::kernel::HyperEncoder), an optional
//! [`PrototypeBank`](crate::kernel::PrototypeBank), a
//! [`SkillIndex`](crate::memory::SkillIndex) and the attention state, and
//! delegates to the [`kernel`](crate::kernel), [`memory`](crate::memory) and
//! [`intent`](crate::intent) layers.
//!
//! For library code that needs finer control, prefer importing from those
//! layers directly.

pub mod engine;

pub use engine::{Engine, Resolution};
