// Test modules for all components
pub mod common;
pub mod test_environment;
pub mod test_persistence;
pub mod test_trainer;
