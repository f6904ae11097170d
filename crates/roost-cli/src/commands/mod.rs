pub mod post;
pub mod serve;
