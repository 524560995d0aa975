pub mod extractor;
pub mod jwt;
pub mod test_utils;

#[cfg(feature = "testing")]
pub mod store_mock;
