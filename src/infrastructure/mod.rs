pub mod google;
pub mod media;
pub mod storage;
