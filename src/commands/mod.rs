pub mod build;
pub mod extract;
pub mod inventory;
pub mod merge_pdf;
mod pipeline;
pub mod render;
#[cfg(test)]
mod tests;
