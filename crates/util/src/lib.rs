pub mod by_ptr;
pub mod string;
