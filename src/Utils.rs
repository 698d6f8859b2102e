/// logger initialisation
pub mod logger;
