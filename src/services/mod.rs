pub mod password;
pub mod upstream;
