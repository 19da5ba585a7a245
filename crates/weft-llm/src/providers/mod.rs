pub mod openai;
pub mod stub;
