pub mod error;
pub mod gateway;
pub mod ids;
pub mod local;
pub mod openai;
pub mod redis;
pub mod retry;
#[cfg(test)]
mod testing;
