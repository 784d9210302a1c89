//! Scenario tests for the generation pipeline.

mod scripted_client;
