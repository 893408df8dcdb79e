// Project planning pipeline
pub mod planner;

// Model provider and JSON helpers shared by the pipeline stages
pub mod workflow_utils;
