//! Cross-crate tests for the scan engine running over the simulated world.

#[cfg(test)]
mod fixtures;

#[cfg(test)]
mod laws;

#[cfg(test)]
mod scenarios;
