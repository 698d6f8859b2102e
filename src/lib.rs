#[allow(non_snake_case)]
pub mod Modeling;
#[allow(non_snake_case)]
pub mod Sensitivity;
#[allow(non_snake_case)]
pub mod Solvers;
#[allow(non_snake_case)]
pub mod Utils;
pub mod cli;
pub mod settings;
