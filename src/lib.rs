#![deny(dead_code)]
#![deny(unused_imports)]

pub mod io;
pub mod kruskal;
pub mod popularity;
pub mod sparse;
