//! Public types for the Vitrine API.

mod filter;
mod image;
mod key;
mod page;
mod render;

pub use filter::{TagSet, Visibility};
pub use image::ImageRecord;
pub use key::CacheKey;
pub use page::FeedPage;
pub use render::{Placement, RenderInstruction};
