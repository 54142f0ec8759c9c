mod discover;
mod export;
mod pages;
mod run;

pub use run::run;
