pub mod prelude;

pub mod requirements;
