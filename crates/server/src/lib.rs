pub mod api;
pub mod metrics;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
