pub mod movement_reader;
