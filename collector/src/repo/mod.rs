pub mod sinks;
pub mod sources;

#[cfg(test)]
pub mod fakes;
