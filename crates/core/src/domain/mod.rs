pub mod budget;
pub mod input;
pub mod location;
pub mod quote;
pub mod task;
pub mod tax;
