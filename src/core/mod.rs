pub mod clip;
pub mod project;
pub mod state;
pub mod track;
pub mod transport;
pub mod viewport;
