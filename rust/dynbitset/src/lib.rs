pub mod bit_vector;


pub use bit_vector::{BitVector, SetBitsIter};
