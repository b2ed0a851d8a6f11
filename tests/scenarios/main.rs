//! Scenario-based tests for nodecd

mod helpers;

mod failure_handling;
mod graph_shapes;
