pub mod factories;
pub mod factory;
pub mod fake_engine;

pub use factory::Factory;
pub use fake_engine::FakeEngine;
