//! Wire codecs for the remoting endpoint.

pub mod binary;

pub use binary::SiteletBincodeCodec;
