pub mod requirement;
