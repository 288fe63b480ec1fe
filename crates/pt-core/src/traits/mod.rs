//! Core trait definitions

mod broker;

pub use broker::DescriptorSource;
