pub mod canvas;
pub mod gui;
pub mod persistence;
pub mod store;
