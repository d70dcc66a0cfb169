//! Matrix module: triplets, storage, images and the distributed matrix.

pub mod counted_set;
pub mod dense;
pub mod distributed;
pub mod generate;
pub mod image;
pub mod storage;
pub mod triplet;

pub use counted_set::CountedSet;
pub use distributed::DistributedMatrix;
pub use generate::{eye, random_triplets, sprand};
pub use image::MatrixImage;
pub use storage::{Storage, TripletStorage};
pub use triplet::Triplet;
