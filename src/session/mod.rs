pub mod input;
pub mod lesson;
pub mod progression;
pub mod result;
