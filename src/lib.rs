pub mod audio;
pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod feedback;
pub mod guide;
pub mod input;
pub mod recognizer;
pub mod scanner;
