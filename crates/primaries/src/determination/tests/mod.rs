mod common;
mod dates;
mod orchestrator;
