pub mod square_button;
