// Event tagging: reference vocabulary plus the staged extractor that consumes it.
pub mod tags;
pub mod vocabulary;
